/// カメラ入力アダプタ
///
/// OpenCVのVideoCaptureを使用したフレームソース実装。
/// BGR形式のフレームをDomainのFrame型へ変換して供給する。

use crate::domain::{DomainError, DomainResult, Frame, FrameSourcePort};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

/// カメラ入力アダプタ
pub struct CameraFrameSource {
    capture: VideoCapture,
    device_index: u32,
}

impl CameraFrameSource {
    /// カメラを開く
    ///
    /// # Arguments
    /// - `device_index`: カメラデバイスのインデックス（通常は0）
    ///
    /// # Returns
    /// - `Ok(CameraFrameSource)`: オープン成功
    /// - `Err(DomainError::Initialization)`: デバイスを開けない
    pub fn new(device_index: u32) -> DomainResult<Self> {
        let capture = VideoCapture::new(device_index as i32, videoio::CAP_ANY)
            .map_err(|e| {
                DomainError::Initialization(format!("Failed to create capture: {:?}", e))
            })?;

        let opened = capture.is_opened().map_err(|e| {
            DomainError::Initialization(format!("Failed to query capture state: {:?}", e))
        })?;
        if !opened {
            return Err(DomainError::Initialization(format!(
                "Failed to open camera {}",
                device_index
            )));
        }

        tracing::info!("Camera {} opened", device_index);

        Ok(Self {
            capture,
            device_index,
        })
    }
}

impl FrameSourcePort for CameraFrameSource {
    /// フレームを1枚読み取る（ブロッキング）
    ///
    /// フレームサイズは毎回Matの実寸から取る。デバイスによっては
    /// 実行中に解像度が変わりうるため、初期値をキャッシュしない。
    fn next_frame(&mut self) -> DomainResult<Frame> {
        let mut mat = Mat::default();
        let ok = self
            .capture
            .read(&mut mat)
            .map_err(|e| DomainError::FrameAcquisition(format!("Camera read failed: {:?}", e)))?;

        if !ok || mat.empty() {
            return Err(DomainError::FrameAcquisition(format!(
                "Camera {} returned no frame",
                self.device_index
            )));
        }

        let width = mat.cols() as u32;
        let height = mat.rows() as u32;
        let data = mat
            .data_bytes()
            .map_err(|e| {
                DomainError::FrameAcquisition(format!("Failed to access frame data: {:?}", e))
            })?
            .to_vec();

        Ok(Frame::new(data, width, height))
    }
}

impl Drop for CameraFrameSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
        tracing::info!("Camera {} released", self.device_index);
    }
}
