//! 距離マッピング（Application層）
//!
//! 2本の指先間のユークリッド距離を計算し、[min, max]の距離レンジを
//! 0-5の離散レベルへ線形変換します。

use crate::application::geometry::finger_positions;
use crate::domain::{FingerName, HandObservation, PixelPoint, ScaleLevel};

/// 指先2点間の測定結果
#[derive(Debug, Clone, Copy)]
pub struct FingertipSpan {
    pub tip_a: PixelPoint,
    pub tip_b: PixelPoint,
    /// 平面ユークリッド距離（ピクセル）
    pub distance: f64,
}

/// 2本の指の指先間を測定する
///
/// 各指の座標列の最後の要素（指先）同士の距離を取る。
///
/// # Returns
/// - `Some(FingertipSpan)`: 両指とも解決できた場合
/// - `None`: 手なし、またはいずれかの指が利用不可
pub fn fingertip_span(
    observation: Option<&HandObservation>,
    frame_width: u32,
    frame_height: u32,
    finger_a: FingerName,
    finger_b: FingerName,
) -> Option<FingertipSpan> {
    let tip_a = finger_positions(observation, frame_width, frame_height, finger_a)?.tip();
    let tip_b = finger_positions(observation, frame_width, frame_height, finger_b)?.tip();

    Some(FingertipSpan {
        tip_a,
        tip_b,
        distance: tip_a.distance_to(&tip_b),
    })
}

/// 指先間距離のみを返す版
#[allow(dead_code)]
pub fn fingertip_distance(
    observation: Option<&HandObservation>,
    frame_width: u32,
    frame_height: u32,
    finger_a: FingerName,
    finger_b: FingerName,
) -> Option<f64> {
    fingertip_span(observation, frame_width, frame_height, finger_a, finger_b)
        .map(|span| span.distance)
}

/// 距離を0-5のスケールレベルへ変換する
///
/// 距離をまず[min_distance, max_distance]へクランプし、[0, 5]へ線形補間
/// したうえで整数へ切り捨てる。クランプが先にあるため両端で正確に飽和する
/// （min未満→0、max超過→5）。範囲外の整数キー参照は起こりえない。
///
/// # Arguments
/// - `distance`: 測定された指先間距離（ピクセル）
/// - `min_distance` / `max_distance`: スケーリングの距離レンジ（min < max）
pub fn map_distance_to_scale(distance: f64, min_distance: f64, max_distance: f64) -> ScaleLevel {
    let span = max_distance - min_distance;
    if span <= 0.0 {
        return ScaleLevel::Zero;
    }

    let clamped = distance.clamp(min_distance, max_distance);
    let scaled = (clamped - min_distance) / span * 5.0;

    // クランプ済みなのでscaledは[0.0, 5.0]に収まる
    match scaled.trunc() as u8 {
        0 => ScaleLevel::Zero,
        1 => ScaleLevel::One,
        2 => ScaleLevel::Two,
        3 => ScaleLevel::Three,
        4 => ScaleLevel::Four,
        _ => ScaleLevel::Five,
    }
}
