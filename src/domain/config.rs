//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{DomainError, DomainResult, FingerName};

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// カメラ設定
    pub camera: CameraConfig,
    /// ハンドトラッカー設定
    pub tracker: TrackerConfig,
    /// ジェスチャ（距離→レベル変換）設定
    pub gesture: GestureConfig,
    /// シリアル通信設定
    pub serial: SerialConfig,
    /// ループ設定
    pub pipeline: PipelineConfig,
}

/// カメラ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CameraConfig {
    /// カメラデバイスのインデックス
    ///
    /// 通常は0（既定のカメラ）
    pub device_index: u32,
}

impl CameraConfig {
    /// デフォルトのカメラインデックス
    pub const DEFAULT_DEVICE_INDEX: u32 = 0;
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: Self::DEFAULT_DEVICE_INDEX,
        }
    }
}

/// ハンドトラッカー設定
///
/// プロバイダへ渡すパラメータを不変の設定値として明示する。
/// コンストラクタの可変デフォルトには依存しない。
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrackerConfig {
    /// トラッカーサブプロセスのPython実行ファイル
    ///
    /// デフォルト: "python3"
    #[serde(default = "default_python_bin")]
    pub python_bin: String,

    /// ランドマーク検出スクリプトのパス
    #[serde(default = "default_tracker_script")]
    pub script_path: String,

    /// 静止画モード（falseで映像ストリーム向けトラッキング）
    #[serde(default)]
    pub static_image_mode: bool,

    /// 検出する手の最大数
    ///
    /// 複数検出時も最初の1つのみ使用する
    pub max_hands: u32,

    /// モデル複雑度（高いほど高精度）
    pub model_complexity: u32,

    /// 手検出の最小信頼度
    pub detection_confidence: f32,

    /// 手トラッキングの最小信頼度
    pub tracking_confidence: f32,
}

fn default_python_bin() -> String {
    "python3".to_string()
}

fn default_tracker_script() -> String {
    "scripts/hand_landmarker.py".to_string()
}

impl TrackerConfig {
    /// デフォルトの最大手数
    pub const DEFAULT_MAX_HANDS: u32 = 1;
    /// デフォルトのモデル複雑度
    pub const DEFAULT_MODEL_COMPLEXITY: u32 = 1;
    /// デフォルトの検出信頼度
    pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.9;
    /// デフォルトのトラッキング信頼度
    pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.9;
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            python_bin: default_python_bin(),
            script_path: default_tracker_script(),
            static_image_mode: false,
            max_hands: Self::DEFAULT_MAX_HANDS,
            model_complexity: Self::DEFAULT_MODEL_COMPLEXITY,
            detection_confidence: Self::DEFAULT_DETECTION_CONFIDENCE,
            tracking_confidence: Self::DEFAULT_TRACKING_CONFIDENCE,
        }
    }
}

/// ジェスチャ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GestureConfig {
    /// 距離を測る1本目の指
    ///
    /// 選択肢: "thumb", "index", "middle", "ring", "pinky"
    pub finger_a: FingerName,

    /// 距離を測る2本目の指
    pub finger_b: FingerName,

    /// レベル0に対応する指間距離（ピクセル）
    ///
    /// これ未満の距離はレベル0に飽和する
    pub min_distance: f64,

    /// レベル5に対応する指間距離（ピクセル）
    ///
    /// これ超過の距離はレベル5に飽和する
    pub max_distance: f64,
}

impl GestureConfig {
    /// デフォルトの最小距離（ピクセル）
    pub const DEFAULT_MIN_DISTANCE: f64 = 15.0;
    /// デフォルトの最大距離（ピクセル）
    pub const DEFAULT_MAX_DISTANCE: f64 = 200.0;
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            finger_a: FingerName::Thumb,
            finger_b: FingerName::Index,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
            max_distance: Self::DEFAULT_MAX_DISTANCE,
        }
    }
}

/// シリアル通信設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SerialConfig {
    /// ボーレート
    ///
    /// デフォルト: 9600（8N1）
    pub baud_rate: u32,

    /// ポート番号サフィックス（オプション）
    ///
    /// 指定するとポート選択プロンプトをスキップする。
    /// 例: "2" → Windowsでは "COM2"、それ以外では "/dev/ttyUSB2"
    #[serde(default)]
    pub port_suffix: Option<String>,
}

impl SerialConfig {
    /// デフォルトのボーレート
    pub const DEFAULT_BAUD_RATE: u32 = 9600;
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: Self::DEFAULT_BAUD_RATE,
            port_suffix: None,
        }
    }
}

/// ループ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineConfig {
    /// 目標イテレーションレート（回/秒）
    ///
    /// 各イテレーションの残余時間をスリープで消化する
    pub target_fps: u32,

    /// 統計情報の出力間隔（秒）
    pub stats_interval_sec: u64,
}

impl PipelineConfig {
    /// デフォルトの目標レート
    pub const DEFAULT_TARGET_FPS: u32 = 24;
    /// デフォルトの統計出力間隔（秒）
    pub const DEFAULT_STATS_INTERVAL_SEC: u64 = 10;

    /// 1イテレーションの目標周期
    pub fn target_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps as f64)
    }

    /// 統計出力間隔をDurationとして取得
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_sec)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fps: Self::DEFAULT_TARGET_FPS,
            stats_interval_sec: Self::DEFAULT_STATS_INTERVAL_SEC,
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    #[allow(dead_code)]
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // ジェスチャ設定の検証
        if self.gesture.finger_a == self.gesture.finger_b {
            return Err(DomainError::Configuration(
                "finger_a and finger_b must name different fingers".to_string(),
            ));
        }
        if self.gesture.min_distance < 0.0 {
            return Err(DomainError::Configuration(
                "min_distance must be non-negative".to_string(),
            ));
        }
        if self.gesture.min_distance >= self.gesture.max_distance {
            return Err(DomainError::Configuration(
                "min_distance must be less than max_distance".to_string(),
            ));
        }

        // トラッカー設定の検証
        let tracker = &self.tracker;
        if !(0.0..=1.0).contains(&tracker.detection_confidence)
            || !(0.0..=1.0).contains(&tracker.tracking_confidence)
        {
            return Err(DomainError::Configuration(
                "Confidence thresholds must be within 0.0-1.0".to_string(),
            ));
        }
        if tracker.max_hands == 0 {
            return Err(DomainError::Configuration(
                "max_hands must be greater than 0".to_string(),
            ));
        }

        // シリアル設定の検証
        if self.serial.baud_rate == 0 {
            return Err(DomainError::Configuration(
                "baud_rate must be greater than 0".to_string(),
            ));
        }

        // ループ設定の検証
        if self.pipeline.target_fps == 0 {
            return Err(DomainError::Configuration(
                "target_fps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.gesture.finger_a, FingerName::Thumb);
        assert_eq!(config.gesture.finger_b, FingerName::Index);
        assert_eq!(config.gesture.min_distance, 15.0);
        assert_eq!(config.gesture.max_distance, 200.0);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.pipeline.target_fps, 24);
    }

    #[test]
    fn test_target_period() {
        let config = PipelineConfig {
            target_fps: 24,
            stats_interval_sec: 10,
        };
        // 1/24秒 ≒ 41.6ms
        let period = config.target_period();
        assert!(period > Duration::from_millis(41));
        assert!(period < Duration::from_millis(42));
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        // 同一指の組はエラー
        config.gesture.finger_b = FingerName::Thumb;
        assert!(config.validate().is_err());

        config.gesture.finger_b = FingerName::Index;

        // 距離範囲の逆転はエラー
        config.gesture.min_distance = 300.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_confidence() {
        let mut config = AppConfig::default();
        config.tracker.detection_confidence = 1.5;
        assert!(config.validate().is_err());

        config.tracker.detection_confidence = 0.9;
        config.tracker.tracking_confidence = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_fps() {
        let mut config = AppConfig::default();
        config.pipeline.target_fps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_parses_full_document() {
        let toml = r#"
            [camera]
            device_index = 1

            [tracker]
            python_bin = "python3"
            script_path = "scripts/hand_landmarker.py"
            static_image_mode = false
            max_hands = 1
            model_complexity = 1
            detection_confidence = 0.9
            tracking_confidence = 0.9

            [gesture]
            finger_a = "thumb"
            finger_b = "middle"
            min_distance = 20.0
            max_distance = 180.0

            [serial]
            baud_rate = 115200
            port_suffix = "3"

            [pipeline]
            target_fps = 30
            stats_interval_sec = 5
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.camera.device_index, 1);
        assert_eq!(config.gesture.finger_b, FingerName::Middle);
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.port_suffix.as_deref(), Some("3"));
        assert_eq!(config.pipeline.target_fps, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_optional_fields_default() {
        // port_suffixとトラッカーのパス類は省略可能
        let toml = r#"
            [camera]
            device_index = 0

            [tracker]
            max_hands = 1
            model_complexity = 1
            detection_confidence = 0.9
            tracking_confidence = 0.9

            [gesture]
            finger_a = "thumb"
            finger_b = "index"
            min_distance = 15.0
            max_distance = 200.0

            [serial]
            baud_rate = 9600

            [pipeline]
            target_fps = 24
            stats_interval_sec = 10
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert!(config.serial.port_suffix.is_none());
        assert_eq!(config.tracker.python_bin, "python3");
        assert!(!config.tracker.static_image_mode);
    }

    #[test]
    fn test_config_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        AppConfig::write_default(&path).unwrap();
        let config = AppConfig::from_file(&path).unwrap();

        config.validate().unwrap();
        assert_eq!(config.serial.baud_rate, SerialConfig::DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_config_loads() {
        let config = AppConfig::from_file("config.toml").expect("config.tomlが読み込めません");

        config
            .validate()
            .expect("設定値のバリデーションに失敗しました");
    }

    #[test]
    fn test_config_example_loads() {
        // config.toml.exampleが正常に読み込めることを確認
        let config = AppConfig::from_file("config.toml.example")
            .expect("config.toml.exampleが読み込めません");

        config
            .validate()
            .expect("設定値のバリデーションに失敗しました");
    }
}
