/// プレビュー表示アダプタ
///
/// OpenCV highguiを使用したフレーム表示と終了キー受付の実装。
/// ジェスチャオーバーレイ（指先間の線・中点・レベル）と指カウントを
/// フレームに重ねて描画する。

use crate::domain::{
    DisplayPort, DomainError, DomainResult, Frame, GestureOverlay, HudState, LoopSignal,
};
use opencv::{
    core::{self, Mat, Point, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

/// プレビューウィンドウ名
const WINDOW_NAME: &str = "Hand Gesture Control";

/// wait_keyのポーリング間隔（ミリ秒）
const WAIT_KEY_MS: i32 = 1;
const KEY_ESC: i32 = 27;
const KEY_Q: i32 = 113;

/// プレビュー表示アダプタ
pub struct PreviewDisplay {
    window_created: bool,
}

impl PreviewDisplay {
    /// 新しいプレビュー表示を作成（ウィンドウは初回present時に生成）
    pub fn new() -> Self {
        Self {
            window_created: false,
        }
    }
}

impl Default for PreviewDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// フレームデータを描画用のMatへ変換する
///
/// 元フレームのバッファは借用のため、自前のバッファへコピーして返す。
fn frame_to_mat(frame: &Frame) -> DomainResult<Mat> {
    let rows = frame.height as i32;
    let cols = frame.width as i32;

    let borrowed = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            rows,
            cols,
            core::CV_8UC3,
            frame.data.as_ptr() as *mut core::c_void,
            core::Mat_AUTO_STEP,
        )
        .map_err(|e| DomainError::Display(format!("Failed to create Mat: {:?}", e)))?
    };

    let mut owned = Mat::default();
    borrowed
        .copy_to(&mut owned)
        .map_err(|e| DomainError::Display(format!("Failed to copy frame: {:?}", e)))?;

    Ok(owned)
}

/// 指先間の線・中点・レベルを描画する
fn draw_gesture(canvas: &mut Mat, overlay: &GestureOverlay) -> DomainResult<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

    let tip_a = Point::new(overlay.tip_a.x, overlay.tip_a.y);
    let tip_b = Point::new(overlay.tip_b.x, overlay.tip_b.y);
    let mid = overlay.midpoint();

    imgproc::line(canvas, tip_a, tip_b, green, 5, LINE_8, 0)
        .map_err(|e| DomainError::Display(format!("Failed to draw line: {:?}", e)))?;
    imgproc::circle(canvas, Point::new(mid.x, mid.y), 8, green, -1, LINE_8, 0)
        .map_err(|e| DomainError::Display(format!("Failed to draw midpoint: {:?}", e)))?;

    imgproc::put_text(
        canvas,
        overlay.level.as_str(),
        Point::new(mid.x + 12, mid.y - 12),
        FONT_HERSHEY_SIMPLEX,
        0.7,
        white,
        2,
        LINE_8,
        false,
    )
    .map_err(|e| DomainError::Display(format!("Failed to draw level: {:?}", e)))?;

    Ok(())
}

/// 指カウント（または「手なし」）を描画する
fn draw_hud(canvas: &mut Mat, hud: &HudState) -> DomainResult<()> {
    let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);

    let text = match hud.extension {
        Some(count) => format!("Fingers: {}", count),
        None => "No hand".to_string(),
    };

    imgproc::put_text(
        canvas,
        &text,
        Point::new(20, 40),
        FONT_HERSHEY_SIMPLEX,
        0.8,
        yellow,
        2,
        LINE_8,
        false,
    )
    .map_err(|e| DomainError::Display(format!("Failed to draw HUD: {:?}", e)))?;

    Ok(())
}

impl DisplayPort for PreviewDisplay {
    /// フレームとHUDを表示し、終了キーを受け付ける
    ///
    /// 'q'またはESCで終了要求を返す。
    fn present(&mut self, frame: &Frame, hud: &HudState) -> DomainResult<LoopSignal> {
        let mut canvas = frame_to_mat(frame)?;

        if let Some(overlay) = &hud.overlay {
            draw_gesture(&mut canvas, overlay)?;
        }
        draw_hud(&mut canvas, hud)?;

        if !self.window_created {
            highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE)
                .map_err(|e| DomainError::Display(format!("Failed to create window: {:?}", e)))?;
            self.window_created = true;
        }

        highgui::imshow(WINDOW_NAME, &canvas)
            .map_err(|e| DomainError::Display(format!("Failed to show frame: {:?}", e)))?;

        let key = highgui::wait_key(WAIT_KEY_MS)
            .map_err(|e| DomainError::Display(format!("Failed to wait for key: {:?}", e)))?;

        if key == KEY_Q || key == KEY_ESC {
            Ok(LoopSignal::Quit)
        } else {
            Ok(LoopSignal::Continue)
        }
    }

    /// ウィンドウを破棄する（冪等）
    fn close(&mut self) {
        if self.window_created {
            let _ = highgui::destroy_all_windows();
            self.window_created = false;
        }
    }
}

impl Drop for PreviewDisplay {
    fn drop(&mut self) {
        DisplayPort::close(self);
    }
}
