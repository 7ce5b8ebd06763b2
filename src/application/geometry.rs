//! 指ジオメトリ解析（Application層）
//!
//! 手の観測結果から、指ごとのランドマーク部分集合を絶対ピクセル座標列として
//! 解決します。観測結果は毎フレーム引数で受け渡しされ、検出器側の
//! 暗黙の状態には依存しません。

use crate::domain::{FingerName, FingerPositions, HandObservation};

/// 1本の指の絶対座標列を解決する
///
/// 座標変換は渡されたフレームの実サイズで行う（フレームサイズは
/// 可変のため、キャッシュした寸法は使わない）。
///
/// # Arguments
/// - `observation`: 現在フレームの手の観測結果（`None` = 手なし）
/// - `frame_width` / `frame_height`: 現在フレームの実寸
/// - `finger`: 解決する指
///
/// # Returns
/// - `Some(FingerPositions)`: ランドマークインデックス順の絶対座標列
/// - `None`: このフレームで手が観測されていない
pub fn finger_positions(
    observation: Option<&HandObservation>,
    frame_width: u32,
    frame_height: u32,
    finger: FingerName,
) -> Option<FingerPositions> {
    let observation = observation?;

    let points = finger
        .landmark_indices()
        .iter()
        .map(|&idx| observation.landmarks[idx].to_pixel(frame_width, frame_height))
        .collect();

    FingerPositions::new(finger, points)
}

/// 全指の座標列を固定順で解決する
///
/// 順序は{親指, 人差し指, 中指, 薬指, 小指}で固定。
/// 1本の指が利用不可でも失敗にはせず、その要素だけ`None`になる。
pub fn all_finger_positions(
    observation: Option<&HandObservation>,
    frame_width: u32,
    frame_height: u32,
) -> [Option<FingerPositions>; 5] {
    FingerName::ALL
        .map(|finger| finger_positions(observation, frame_width, frame_height, finger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Landmark, PixelPoint, LANDMARK_COUNT};

    /// ランドマークiを(i/100, i/200)に置いた合成観測を作成
    fn synthetic_observation() -> HandObservation {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (i, lm) in landmarks.iter_mut().enumerate() {
            *lm = Landmark::new(i as f32 / 100.0, i as f32 / 200.0, 0.0);
        }
        HandObservation::new(landmarks, 0.95)
    }

    #[test]
    fn test_finger_positions_resolves_indices_in_order() {
        let obs = synthetic_observation();
        let positions =
            finger_positions(Some(&obs), 100, 200, FingerName::Thumb).unwrap();

        // 親指はインデックス{2,3,4} → x = 2,3,4 / y = 2,3,4
        assert_eq!(
            positions.points(),
            &[
                PixelPoint::new(2, 2),
                PixelPoint::new(3, 3),
                PixelPoint::new(4, 4),
            ]
        );
        assert_eq!(positions.tip(), PixelPoint::new(4, 4));
    }

    #[test]
    fn test_finger_positions_uses_frame_dimensions() {
        let obs = synthetic_observation();

        // 同じ観測でもフレームサイズが変われば絶対座標も変わる
        let small = finger_positions(Some(&obs), 100, 200, FingerName::Index).unwrap();
        let large = finger_positions(Some(&obs), 200, 400, FingerName::Index).unwrap();

        assert_eq!(small.tip(), PixelPoint::new(8, 8));
        assert_eq!(large.tip(), PixelPoint::new(16, 16));
    }

    #[test]
    fn test_finger_positions_no_hand() {
        assert!(finger_positions(None, 640, 480, FingerName::Middle).is_none());
    }

    #[test]
    fn test_all_fingers_fixed_order() {
        let obs = synthetic_observation();
        let all = all_finger_positions(Some(&obs), 100, 200);

        for (slot, finger) in all.iter().zip(FingerName::ALL) {
            let positions = slot.as_ref().unwrap();
            assert_eq!(positions.finger(), finger);
        }

        // 人差し指の指先はランドマーク8
        assert_eq!(all[1].as_ref().unwrap().tip(), PixelPoint::new(8, 8));
    }

    #[test]
    fn test_all_fingers_no_hand() {
        let all = all_finger_positions(None, 640, 480);
        assert!(all.iter().all(|slot| slot.is_none()));
    }
}
