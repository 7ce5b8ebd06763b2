//! デバウンス送信（Application層）
//!
//! スケールレベルの変化時のみワイヤへ書き込む送信器。
//! 最後に送信成功したレベルを記録し、同じ値の繰り返し送信を抑制します。

use crate::domain::{DomainResult, ScaleLevel, SerialLinkPort};

/// デバウンス付きレベル送信器
///
/// 不変条件: レベルがワイヤへ書き込まれるのは、直前に送信成功した値と
/// 異なる場合に限る。送信失敗時は記録を更新しない。
pub struct LevelTransmitter<L: SerialLinkPort> {
    link: L,
    /// 最後に送信成功したレベル（起動直後はなし）
    last_sent: Option<ScaleLevel>,
}

impl<L: SerialLinkPort> LevelTransmitter<L> {
    /// 新しい送信器を作成
    pub fn new(link: L) -> Self {
        Self {
            link,
            last_sent: None,
        }
    }

    /// レベルを送信する（変化時のみワイヤ書き込み）
    ///
    /// ペイロードはASCII十進数字1文字 + 改行。
    ///
    /// # Returns
    /// - `Ok(true)`: ワイヤへ書き込んだ
    /// - `Ok(false)`: 直前の値と同じためスキップした
    /// - `Err(DomainError::Link)`: 書き込み失敗（ストリーミング終了、リトライなし）
    pub fn send(&mut self, level: ScaleLevel) -> DomainResult<bool> {
        if self.last_sent == Some(level) {
            return Ok(false);
        }

        self.link.send_bytes(&level.encode())?;
        self.last_sent = Some(level);
        tracing::info!("Sent: {} ({})", level, level.as_str());

        Ok(true)
    }

    /// 最後に送信成功したレベル
    #[allow(dead_code)]
    pub fn last_sent(&self) -> Option<ScaleLevel> {
        self.last_sent
    }

    /// リンクを閉じる（冪等）
    pub fn close(&mut self) {
        self.link.close();
    }

    /// リンクが開いているか
    #[allow(dead_code)]
    pub fn is_open(&self) -> bool {
        self.link.is_open()
    }
}
