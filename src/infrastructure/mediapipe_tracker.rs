/// MediaPipeトラッカーアダプタ
///
/// Pythonサブプロセス経由でMediaPipe Hand Landmarkerを実行する
/// ランドマークプロバイダの実装。フレームごとに
/// 「LEヘッダ(width/height/channels) + 生BGRバイト列」をstdinへ送り、
/// JSON1行の検出結果をstdoutから読む。起動時には"READY"行で
/// ハンドシェイクし、以後セッションリセットなしで繰り返し呼び出せる。

use crate::domain::{
    DomainError, DomainResult, Frame, HandObservation, HandTrackerPort, Landmark, TrackerConfig,
    LANDMARK_COUNT,
};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, Stdio};

/// フレームのチャンネル数（BGR固定）
const FRAME_CHANNELS: u32 = 3;

/// トラッカープロセスからのJSON応答
#[derive(Deserialize, Debug)]
struct DetectionWire {
    #[serde(default)]
    hands: Vec<HandWire>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct HandWire {
    score: f32,
    landmarks: Vec<LandmarkWire>,
}

#[derive(Deserialize, Debug)]
struct LandmarkWire {
    x: f32,
    y: f32,
    z: f32,
}

/// MediaPipeトラッカーアダプタ
pub struct MediaPipeTracker {
    process: Child,
    stdout: BufReader<ChildStdout>,
}

impl MediaPipeTracker {
    /// トラッカーサブプロセスを起動する
    ///
    /// 設定は不変の値としてコマンドライン引数で渡す。
    ///
    /// # Returns
    /// - `Ok(MediaPipeTracker)`: READYハンドシェイク完了
    /// - `Err(DomainError::Tracker)`: 起動・ハンドシェイク失敗
    pub fn spawn(config: &TrackerConfig) -> DomainResult<Self> {
        let mut command = Command::new(&config.python_bin);
        command
            .arg(&config.script_path)
            .arg("--max-hands")
            .arg(config.max_hands.to_string())
            .arg("--model-complexity")
            .arg(config.model_complexity.to_string())
            .arg("--detection-confidence")
            .arg(config.detection_confidence.to_string())
            .arg("--tracking-confidence")
            .arg(config.tracking_confidence.to_string());
        if config.static_image_mode {
            command.arg("--static-image-mode");
        }

        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                DomainError::Tracker(format!(
                    "Failed to start tracker process '{} {}': {}",
                    config.python_bin, config.script_path, e
                ))
            })?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| DomainError::Tracker("Failed to capture tracker stdout".to_string()))?;
        let mut stdout = BufReader::new(stdout);

        // READYハンドシェイクを待つ
        let mut ready_line = String::new();
        stdout
            .read_line(&mut ready_line)
            .map_err(|e| DomainError::Tracker(format!("Tracker handshake failed: {}", e)))?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            return Err(DomainError::Tracker(format!(
                "Tracker did not signal ready, got: {}",
                ready_line.trim()
            )));
        }

        tracing::info!(
            "Hand tracker ready (max_hands={}, det_conf={}, trac_conf={})",
            config.max_hands,
            config.detection_confidence,
            config.tracking_confidence
        );

        Ok(Self { process, stdout })
    }
}

impl HandTrackerPort for MediaPipeTracker {
    /// フレームから手を検出する
    ///
    /// プロトコル自体の失敗（プロセス終了、不正なJSON）は致命的。
    /// 手が見つからないことはエラーではない。
    fn detect(&mut self, frame: &Frame) -> DomainResult<Option<HandObservation>> {
        let stdin = self
            .process
            .stdin
            .as_mut()
            .ok_or_else(|| DomainError::Tracker("Tracker stdin is closed".to_string()))?;

        stdin
            .write_all(&frame.width.to_le_bytes())
            .and_then(|()| stdin.write_all(&frame.height.to_le_bytes()))
            .and_then(|()| stdin.write_all(&FRAME_CHANNELS.to_le_bytes()))
            .and_then(|()| stdin.write_all(&frame.data))
            .and_then(|()| stdin.flush())
            .map_err(|e| DomainError::Tracker(format!("Failed to send frame: {}", e)))?;

        let mut response = String::new();
        self.stdout
            .read_line(&mut response)
            .map_err(|e| DomainError::Tracker(format!("Failed to read tracker response: {}", e)))?;
        if response.is_empty() {
            return Err(DomainError::Tracker(
                "Tracker process closed its output".to_string(),
            ));
        }

        let observation = parse_detection_line(response.trim_end())?;
        if let Some(obs) = &observation {
            tracing::debug!("Hand detected (confidence={:.2})", obs.confidence);
        }

        Ok(observation)
    }
}

impl Drop for MediaPipeTracker {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
        tracing::info!("Hand tracker stopped");
    }
}

/// 検出結果のJSON1行をパースする
///
/// 複数の手が含まれる場合も最初の完全な手のみ返す。
/// ランドマーク数が21でない手は部分検出として読み飛ばす。
fn parse_detection_line(line: &str) -> DomainResult<Option<HandObservation>> {
    let wire: DetectionWire = serde_json::from_str(line)
        .map_err(|e| DomainError::Tracker(format!("Invalid tracker response: {}", e)))?;

    if let Some(error) = wire.error {
        return Err(DomainError::Tracker(format!(
            "Tracker reported error: {}",
            error
        )));
    }

    for hand in wire.hands {
        if hand.landmarks.len() != LANDMARK_COUNT {
            tracing::warn!(
                "Expected {} landmarks, got {}",
                LANDMARK_COUNT,
                hand.landmarks.len()
            );
            continue;
        }

        let landmarks: Vec<Landmark> = hand
            .landmarks
            .iter()
            .map(|lm| Landmark::new(lm.x, lm.y, lm.z))
            .collect();

        if let Some(observation) = HandObservation::from_slice(&landmarks, hand.score) {
            return Ok(Some(observation));
        }
    }

    Ok(None)
}
