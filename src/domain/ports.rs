/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層が注入を受けて使用する。
/// 全体が単一スレッド・同期・ブロッキングI/Oの設計のため、
/// Send/Sync境界は課さない。

use crate::domain::{
    DomainError, DomainResult, ExtensionCount, Frame, HandObservation, PixelPoint, ScaleLevel,
};

/// フレームソースポート: カメラからのフレーム取得を抽象化
pub trait FrameSourcePort {
    /// フレームを1枚取得する（ブロッキング）
    ///
    /// # Returns
    /// - `Ok(Frame)`: 取得成功（BGR形式）
    /// - `Err(DomainError::FrameAcquisition)`: 読み取り失敗（致命的、ループ停止）
    fn next_frame(&mut self) -> DomainResult<Frame>;
}

/// ハンドトラッカーポート: ランドマークプロバイダを抽象化
///
/// プロバイダは不透明な外部協力者。1枚の画像を受け取り、
/// 0個以上の手（各21ランドマーク）を返す。セッションリセットなしで
/// フレームごとに繰り返し呼び出せること。
pub trait HandTrackerPort {
    /// フレームから手を検出する
    ///
    /// 複数の手が検出された場合も最初の1つのみ返す。
    ///
    /// # Returns
    /// - `Ok(Some(HandObservation))`: 手を検出
    /// - `Ok(None)`: 手なし（エラーではない。このイテレーションは送信なし）
    /// - `Err(DomainError::Tracker)`: プロバイダ自体の失敗（致命的）
    fn detect(&mut self, frame: &Frame) -> DomainResult<Option<HandObservation>>;
}

/// シリアルリンクポート: ワイヤへの書き込みを抽象化
pub trait SerialLinkPort {
    /// ペイロードをワイヤへ書き込む
    ///
    /// # Returns
    /// - `Ok(())`: 書き込み成功
    /// - `Err(DomainError::Link)`: ドライバ層の失敗（致命的、リトライなし）
    fn send_bytes(&mut self, payload: &[u8]) -> DomainResult<()>;

    /// リンクを閉じる
    ///
    /// 冪等。未オープン・クローズ済みでも安全に呼べる。
    /// すべての終了パスで必ず呼ばれる。
    fn close(&mut self);

    /// リンクが開いているか
    fn is_open(&self) -> bool;
}

/// プレビュー表示ポート: フレーム表示と終了キーの受付を抽象化
pub trait DisplayPort {
    /// フレームとHUDを表示し、終了要求の有無を返す
    ///
    /// # Returns
    /// - `Ok(LoopSignal::Quit)`: 終了キーが押された（1イテレーション以内に停止）
    /// - `Ok(LoopSignal::Continue)`: 継続
    fn present(&mut self, frame: &Frame, hud: &HudState) -> DomainResult<LoopSignal>;

    /// ウィンドウを破棄する（冪等）
    fn close(&mut self);
}

/// ループ継続シグナル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopSignal {
    /// 次のイテレーションへ
    Continue,
    /// 終了要求
    Quit,
}

/// プレビューに重ねるジェスチャ描画情報
///
/// 2本の指先を結ぶ線・中点・現在レベル。
#[derive(Debug, Clone, Copy)]
pub struct GestureOverlay {
    pub tip_a: PixelPoint,
    pub tip_b: PixelPoint,
    pub level: ScaleLevel,
}

impl GestureOverlay {
    /// 指先2点の中点
    pub fn midpoint(&self) -> PixelPoint {
        self.tip_a.midpoint(&self.tip_b)
    }
}

/// HUD表示状態
///
/// extensionがNoneのときは「手なし」を表示する（0本とは区別する）。
#[derive(Debug, Clone, Copy, Default)]
pub struct HudState {
    pub overlay: Option<GestureOverlay>,
    pub extension: Option<ExtensionCount>,
}

/// シリアルポート記述子
///
/// 列挙結果の1エントリ。Displayは操作者に提示する1行
/// （例: "COM2 - USB Serial"）を生成する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// ポート名（例: "COM2", "/dev/ttyUSB0"）
    pub name: String,
    /// 人間可読な説明（不明な場合は空文字列）
    pub description: String,
}

impl PortDescriptor {
    /// 新しい記述子を作成
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} - {}", self.name, self.description)
        }
    }
}

/// ユーザー入力のサフィックスをプラットフォームのポート名へ変換
///
/// Windowsは "COM{suffix}"、それ以外は "/dev/ttyUSB{suffix}"。
pub fn platform_port_name(suffix: &str) -> String {
    #[cfg(windows)]
    {
        format!("COM{}", suffix)
    }
    #[cfg(not(windows))]
    {
        format!("/dev/ttyUSB{}", suffix)
    }
}

/// ポート名プレフィックスで記述子を照合する
///
/// 記述子の文字列形式が`port_name`で始まるものがあれば、そのポート名を返す。
///
/// # Returns
/// - `Some(String)`: 一致あり（照合に使ったポート名）
/// - `None`: 一致なし
pub fn match_port(port_name: &str, available: &[PortDescriptor]) -> Option<String> {
    available
        .iter()
        .any(|desc| desc.to_string().starts_with(port_name))
        .then(|| port_name.to_string())
}

/// ユーザー入力からポートを選択する
///
/// 見つからない場合は実行全体にとって致命的なエラー。
/// 再プロンプトはせず、呼び出し側が報告して終了する。
///
/// # Returns
/// - `Ok(String)`: 解決されたポート名
/// - `Err(DomainError::PortSelection)`: 一致する記述子なし
pub fn select_port(user_input: &str, available: &[PortDescriptor]) -> DomainResult<String> {
    let port_name = platform_port_name(user_input.trim());
    match_port(&port_name, available)
        .ok_or_else(|| DomainError::PortSelection(format!("{} not found", port_name)))
}
