/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - 「手が見えない」は エラーではなく Option::None として各段階を流れる
///   （例外による制御フローを持ち込まない）

use thiserror::Error;

/// Domain層の統一エラー型
///
/// すべて致命的エラー。自動リトライは行わず、単一の終了処理パスへ
/// 合流してカメラ・シリアルポートを解放する。
#[derive(Error, Debug)]
pub enum DomainError {
    /// ポート選択エラー（要求されたポートが列挙結果に存在しない）
    ///
    /// ハードウェアに触れる前に発生する。実行全体を中断する。
    #[error("Port selection error: {0}")]
    PortSelection(String),

    /// シリアルリンクエラー（open/writeのドライバ層失敗）
    ///
    /// デバイスはオペレータの介入が必要と見なし、リトライしない。
    #[error("Serial link error: {0}")]
    Link(String),

    /// フレーム取得エラー（カメラ読み取り失敗）
    #[error("Frame acquisition error: {0}")]
    FrameAcquisition(String),

    /// トラッカーエラー（ランドマークプロバイダの起動・プロトコル失敗）
    #[error("Hand tracker error: {0}")]
    Tracker(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 初期化エラー
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// 表示関連のエラー
    #[error("Display error: {0}")]
    Display(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
