//! 指伸展分類（Application層）
//!
//! 5指の座標列から「伸びている指の本数」を導出します。

use crate::domain::{ExtensionCount, FingerPositions};

/// 伸びている指の本数を数える
///
/// 判定規則: 各指について、指先のx座標がインデックス順で1つ手前の
/// ランドマークのx座標より大きければ「伸びている」。親指も他の指と
/// 同じx比較を使う（手の向きやy軸方向の動きは区別しない。解剖学的な
/// 屈曲判定ではなく、このx比較そのものを規則として固定している）。
///
/// # Arguments
/// - `fingers`: 固定順{親指, 人差し指, 中指, 薬指, 小指}の座標列
///
/// # Returns
/// - `Some(ExtensionCount)`: 0-5本
/// - `None`: 手が観測されていない（「0本」とは区別される）
pub fn extended_count(fingers: &[Option<FingerPositions>; 5]) -> Option<ExtensionCount> {
    let mut count = 0u8;
    for slot in fingers {
        let positions = slot.as_ref()?;
        if positions.tip().x > positions.below_tip().x {
            count += 1;
        }
    }

    // 指1本につき1票なので5を超えることはない
    ExtensionCount::new(count)
}
