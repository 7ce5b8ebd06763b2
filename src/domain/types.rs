/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// フレーム・ランドマーク・指・スケールレベルなど、すべての処理で共有される型。

use std::time::Instant;

/// 1つの手あたりのランドマーク数（MediaPipe Hand Landmarker準拠）
pub const LANDMARK_COUNT: usize = 21;

/// 正規化座標のランドマーク1点
///
/// x/yは画像サイズに対する[0,1]の正規化座標。zは手首基準の相対深度。
/// 毎フレーム再計算される一時データであり、永続化しない。
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    /// 新しいランドマークを作成
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 正規化座標をフレーム実寸のピクセル座標へ変換
    ///
    /// 変換は常に渡されたフレームの実サイズで行う（キャッシュした値は使わない）。
    /// `absolute = round(normalized * frame_dimension)`
    pub fn to_pixel(&self, frame_width: u32, frame_height: u32) -> PixelPoint {
        PixelPoint {
            x: (self.x * frame_width as f32).round() as i32,
            y: (self.y * frame_height as f32).round() as i32,
        }
    }
}

/// 絶対ピクセル座標の1点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    /// 新しいピクセル座標を作成
    #[allow(dead_code)]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 2点間の平面ユークリッド距離
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }

    /// 2点の中点（整数座標、切り捨て）
    pub fn midpoint(&self, other: &PixelPoint) -> PixelPoint {
        PixelPoint {
            x: (self.x + other.x) / 2,
            y: (self.y + other.y) / 2,
        }
    }
}

/// 検出された1つの手の観測結果
///
/// 21個のランドマークを固定順で保持する。現在のフレームの処理パスが
/// 排他的に所有し、次のプロバイダ呼び出しで必ず置き換えられる。
#[derive(Debug, Clone)]
pub struct HandObservation {
    /// 21個のランドマーク（インデックス0-20、解剖学的固定番号）
    pub landmarks: [Landmark; LANDMARK_COUNT],
    /// プロバイダの検出信頼度（0.0-1.0）
    pub confidence: f32,
}

impl HandObservation {
    /// 新しい観測結果を作成
    #[allow(dead_code)]
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], confidence: f32) -> Self {
        Self {
            landmarks,
            confidence,
        }
    }

    /// スライスから観測結果を作成
    ///
    /// # Returns
    /// - `Some(HandObservation)`: ちょうど21点ある場合
    /// - `None`: 点数が不足・超過している場合（部分検出は「検出なし」扱い）
    pub fn from_slice(landmarks: &[Landmark], confidence: f32) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = landmarks.try_into().ok()?;
        Some(Self {
            landmarks,
            confidence,
        })
    }
}

/// キャプチャされたフレームデータ
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（BGR形式、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }
}

/// 指の名前（閉じた列挙）
///
/// 各指はランドマークインデックスの固定・非重複な部分集合へ
/// 決定的に対応する。文字列キーの動的ディスパッチは行わない。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FingerName {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerName {
    /// 全指の固定順（親指→人差し指→中指→薬指→小指）
    pub const ALL: [FingerName; 5] = [
        FingerName::Thumb,
        FingerName::Index,
        FingerName::Middle,
        FingerName::Ring,
        FingerName::Pinky,
    ];

    /// 指に対応するランドマークインデックスの部分集合
    ///
    /// 最後の要素は常に指先。
    pub fn landmark_indices(&self) -> &'static [usize] {
        match self {
            FingerName::Thumb => &[2, 3, 4],
            FingerName::Index => &[5, 6, 7, 8],
            FingerName::Middle => &[9, 10, 11, 12],
            FingerName::Ring => &[13, 14, 15, 16],
            FingerName::Pinky => &[17, 18, 19, 20],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FingerName::Thumb => "thumb",
            FingerName::Index => "index",
            FingerName::Middle => "middle",
            FingerName::Ring => "ring",
            FingerName::Pinky => "pinky",
        }
    }
}

impl std::str::FromStr for FingerName {
    type Err = crate::domain::error::DomainError;

    /// 指名の文字列をパース
    ///
    /// 未知の名前は型付きエラーを返す（パニックしない）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" => Ok(FingerName::Thumb),
            "index" => Ok(FingerName::Index),
            "middle" => Ok(FingerName::Middle),
            "ring" => Ok(FingerName::Ring),
            "pinky" => Ok(FingerName::Pinky),
            other => Err(crate::domain::error::DomainError::Configuration(format!(
                "Unknown finger name: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FingerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1本の指の絶対ピクセル座標列
///
/// ランドマークインデックス順で保持するため、最後の要素は常に指先。
/// 不変条件: 点数はその指のインデックス部分集合とちょうど一致する。
/// 部分検出は「利用不可」扱いであり、補間はしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerPositions {
    finger: FingerName,
    points: Vec<PixelPoint>,
}

impl FingerPositions {
    /// 新しい指座標列を作成
    ///
    /// # Returns
    /// - `Some(FingerPositions)`: 点数が指のランドマーク数と一致する場合
    /// - `None`: 一致しない場合（部分検出）
    pub fn new(finger: FingerName, points: Vec<PixelPoint>) -> Option<Self> {
        if points.len() != finger.landmark_indices().len() {
            return None;
        }
        Some(Self { finger, points })
    }

    #[allow(dead_code)]
    pub fn finger(&self) -> FingerName {
        self.finger
    }

    /// インデックス順の全点
    #[allow(dead_code)]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// 指先（インデックス順の最後の点）
    pub fn tip(&self) -> PixelPoint {
        // 不変条件によりpointsは空にならない
        self.points[self.points.len() - 1]
    }

    /// 指先の1つ手前のランドマーク
    pub fn below_tip(&self) -> PixelPoint {
        self.points[self.points.len() - 2]
    }
}

/// 伸びている指の本数（0-5、指1本につき1票）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExtensionCount(u8);

impl ExtensionCount {
    /// 新しい指カウントを作成
    ///
    /// # Returns
    /// - `Some(ExtensionCount)`: 0-5の範囲内
    /// - `None`: 範囲外
    pub fn new(count: u8) -> Option<Self> {
        if count <= 5 {
            Some(Self(count))
        } else {
            None
        }
    }

    #[allow(dead_code)]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ExtensionCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 量子化された出力信号（0-5の閉じた列挙）
///
/// 指間距離から導出され、変化時のみシリアル送信される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScaleLevel {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl ScaleLevel {
    /// 数値インデックスからレベルを作成
    ///
    /// # Returns
    /// - `Some(ScaleLevel)`: 0-5の範囲内
    /// - `None`: 範囲外
    #[allow(dead_code)]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ScaleLevel::Zero),
            1 => Some(ScaleLevel::One),
            2 => Some(ScaleLevel::Two),
            3 => Some(ScaleLevel::Three),
            4 => Some(ScaleLevel::Four),
            5 => Some(ScaleLevel::Five),
            _ => None,
        }
    }

    pub fn as_index(&self) -> u8 {
        match self {
            ScaleLevel::Zero => 0,
            ScaleLevel::One => 1,
            ScaleLevel::Two => 2,
            ScaleLevel::Three => 3,
            ScaleLevel::Four => 4,
            ScaleLevel::Five => 5,
        }
    }

    /// レベル名（ログ・HUD表示用）
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleLevel::Zero => "ZERO",
            ScaleLevel::One => "ONE",
            ScaleLevel::Two => "TWO",
            ScaleLevel::Three => "THREE",
            ScaleLevel::Four => "FOUR",
            ScaleLevel::Five => "FIVE",
        }
    }

    /// ワイヤペイロードへエンコード
    ///
    /// ASCII十進数字1文字 + 改行（UTF-8）。
    pub fn encode(&self) -> [u8; 2] {
        [b'0' + self.as_index(), b'\n']
    }
}

impl std::fmt::Display for ScaleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_landmark_to_pixel() {
        let lm = Landmark::new(0.5, 0.25, 0.0);
        let px = lm.to_pixel(640, 480);
        assert_eq!(px, PixelPoint::new(320, 120));
    }

    #[test]
    fn test_landmark_to_pixel_rounds() {
        // 0.333 * 100 = 33.3 → 33、0.666 * 100 = 66.6 → 67
        let lm = Landmark::new(0.333, 0.666, 0.0);
        let px = lm.to_pixel(100, 100);
        assert_eq!(px, PixelPoint::new(33, 67));
    }

    #[test]
    fn test_pixel_distance() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_pixel_midpoint() {
        let a = PixelPoint::new(10, 20);
        let b = PixelPoint::new(21, 40);
        assert_eq!(a.midpoint(&b), PixelPoint::new(15, 30));
    }

    #[test]
    fn test_finger_indices_are_disjoint_and_fixed() {
        let mut seen = std::collections::HashSet::new();
        for finger in FingerName::ALL {
            for &idx in finger.landmark_indices() {
                assert!(seen.insert(idx), "index {} mapped twice", idx);
                assert!(idx < LANDMARK_COUNT);
            }
        }
        assert_eq!(FingerName::Thumb.landmark_indices(), &[2, 3, 4]);
        assert_eq!(FingerName::Pinky.landmark_indices(), &[17, 18, 19, 20]);
    }

    #[test]
    fn test_finger_name_from_str() {
        assert_eq!(FingerName::from_str("thumb").unwrap(), FingerName::Thumb);
        assert_eq!(FingerName::from_str("pinky").unwrap(), FingerName::Pinky);

        // 未知の名前は型付きエラー（パニックしない）
        assert!(FingerName::from_str("sixth").is_err());
        assert!(FingerName::from_str("").is_err());
    }

    #[test]
    fn test_hand_observation_from_slice() {
        let full = vec![Landmark::default(); LANDMARK_COUNT];
        assert!(HandObservation::from_slice(&full, 0.9).is_some());

        // 部分検出は観測なし扱い
        let partial = vec![Landmark::default(); 10];
        assert!(HandObservation::from_slice(&partial, 0.9).is_none());
    }

    #[test]
    fn test_finger_positions_invariant() {
        let points = vec![PixelPoint::new(0, 0); 3];
        let positions = FingerPositions::new(FingerName::Thumb, points).unwrap();
        assert_eq!(positions.points().len(), 3);

        // 親指は3点、4点では作成できない
        let wrong = vec![PixelPoint::new(0, 0); 4];
        assert!(FingerPositions::new(FingerName::Thumb, wrong).is_none());
    }

    #[test]
    fn test_finger_positions_tip_is_last() {
        let points = vec![
            PixelPoint::new(1, 1),
            PixelPoint::new(2, 2),
            PixelPoint::new(3, 3),
            PixelPoint::new(4, 4),
        ];
        let positions = FingerPositions::new(FingerName::Index, points).unwrap();
        assert_eq!(positions.tip(), PixelPoint::new(4, 4));
        assert_eq!(positions.below_tip(), PixelPoint::new(3, 3));
    }

    #[test]
    fn test_extension_count_range() {
        assert!(ExtensionCount::new(0).is_some());
        assert!(ExtensionCount::new(5).is_some());
        assert!(ExtensionCount::new(6).is_none());
    }

    #[test]
    fn test_scale_level_roundtrip() {
        for i in 0..=5u8 {
            let level = ScaleLevel::from_index(i).unwrap();
            assert_eq!(level.as_index(), i);
        }
        assert!(ScaleLevel::from_index(6).is_none());
    }

    #[test]
    fn test_scale_level_encode() {
        assert_eq!(ScaleLevel::Zero.encode(), [b'0', b'\n']);
        assert_eq!(ScaleLevel::Three.encode(), [b'3', b'\n']);
        assert_eq!(ScaleLevel::Five.encode(), [b'5', b'\n']);
    }

    #[test]
    fn test_scale_level_names() {
        assert_eq!(ScaleLevel::Zero.as_str(), "ZERO");
        assert_eq!(ScaleLevel::Five.as_str(), "FIVE");
    }
}
