//! 統計情報管理モジュール
//!
//! イテレーションレート、各処理段階のレイテンシ、送信回数などの統計を
//! 収集・出力します。

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 統計情報の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// フレーム取得時間
    Capture,
    /// ランドマーク検出時間
    Track,
    /// シリアル送信時間
    Transmit,
    /// エンドツーエンドのレイテンシ（取得→送信判定まで）
    EndToEnd,
}

/// パーセンタイル統計値
#[derive(Debug, Clone)]
pub struct PercentileStats {
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub count: usize,
}

/// 統計情報コレクター
#[derive(Debug)]
pub struct StatsCollector {
    /// レート計測用のイテレーションタイムスタンプ（最大1秒分保持）
    frame_times: VecDeque<Instant>,
    /// 各処理段階の所要時間（最大1000サンプル保持）
    durations: std::collections::HashMap<StatKind, VecDeque<Duration>>,
    /// ワイヤ書き込み回数（デバウンス通過分のみ）
    transmission_count: u64,
    /// 手が検出されなかったイテレーション数
    detection_gap_count: u64,
    /// 最後の統計出力時刻
    last_report: Instant,
    /// 統計出力間隔
    report_interval: Duration,
}

impl StatsCollector {
    /// レート計算の時間範囲（1秒間のイテレーション数を計測）
    const RATE_WINDOW_SECS: u64 = 1;

    /// 最大サンプル保持数（パーセンタイル計算用）
    const MAX_DURATION_SAMPLES: usize = 1000;

    /// 新しいStatsCollectorを作成
    ///
    /// # Arguments
    /// * `report_interval` - 統計出力間隔（例: 10秒）
    pub fn new(report_interval: Duration) -> Self {
        Self {
            frame_times: VecDeque::new(),
            durations: std::collections::HashMap::new(),
            transmission_count: 0,
            detection_gap_count: 0,
            last_report: Instant::now(),
            report_interval,
        }
    }

    /// イテレーション完了を記録（レート計測用）
    pub fn record_frame(&mut self) {
        let now = Instant::now();
        self.frame_times.push_back(now);

        // 指定秒数より古いタイムスタンプを削除
        let window = Duration::from_secs(Self::RATE_WINDOW_SECS);
        while let Some(&front) = self.frame_times.front() {
            if now.duration_since(front) > window {
                self.frame_times.pop_front();
            } else {
                break;
            }
        }
    }

    /// 処理時間を記録
    pub fn record_duration(&mut self, kind: StatKind, duration: Duration) {
        let queue = self.durations.entry(kind).or_default();
        queue.push_back(duration);

        // 最大サンプル数を超えたら古いデータを破棄
        if queue.len() > Self::MAX_DURATION_SAMPLES {
            queue.pop_front();
        }
    }

    /// ワイヤ書き込みをカウント
    pub fn record_transmission(&mut self) {
        self.transmission_count += 1;
    }

    /// 手なしイテレーションをカウント
    pub fn record_detection_gap(&mut self) {
        self.detection_gap_count += 1;
    }

    /// 現在のイテレーションレートを計算
    pub fn current_rate(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let count = self.frame_times.len() as f64;
        if let (Some(&first), Some(&last)) = (self.frame_times.front(), self.frame_times.back()) {
            let elapsed = last.duration_since(first).as_secs_f64();
            if elapsed > 0.0 {
                return count / elapsed;
            }
        }
        0.0
    }

    /// パーセンタイル統計を計算
    ///
    /// # Returns
    /// パーセンタイル統計値。データがない場合は None
    pub fn percentile_stats(&self, kind: StatKind) -> Option<PercentileStats> {
        let queue = self.durations.get(&kind)?;
        if queue.is_empty() {
            return None;
        }

        let mut sorted: Vec<Duration> = queue.iter().copied().collect();
        sorted.sort();

        let count = sorted.len();
        let p50 = sorted[count * 50 / 100];
        let p95 = sorted[count * 95 / 100];
        let p99 = sorted[count * 99 / 100];

        Some(PercentileStats {
            p50,
            p95,
            p99,
            count,
        })
    }

    /// 送信回数を取得
    #[allow(dead_code)]
    pub fn transmission_count(&self) -> u64 {
        self.transmission_count
    }

    /// 統計レポートを出力すべきか判定
    pub fn should_report(&self) -> bool {
        self.last_report.elapsed() >= self.report_interval
    }

    /// 統計レポートを出力してタイマーをリセット
    pub fn report_and_reset(&mut self) {
        use tracing::info;

        info!("=== Loop Statistics ===");
        info!("Rate: {:.1} it/s", self.current_rate());

        for kind in [
            StatKind::Capture,
            StatKind::Track,
            StatKind::Transmit,
            StatKind::EndToEnd,
        ] {
            if let Some(stats) = self.percentile_stats(kind) {
                info!(
                    "{:?}: p50={:.2}ms, p95={:.2}ms, p99={:.2}ms (n={})",
                    kind,
                    stats.p50.as_secs_f64() * 1000.0,
                    stats.p95.as_secs_f64() * 1000.0,
                    stats.p99.as_secs_f64() * 1000.0,
                    stats.count
                );
            }
        }

        info!("Transmissions: {}", self.transmission_count);
        info!("Detection gaps: {}", self.detection_gap_count);
        info!("=======================");

        self.last_report = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_calculation() {
        let mut stats = StatsCollector::new(Duration::from_secs(10));

        // 100ms間隔で4イテレーション記録（期待レート: ~10）
        for _ in 0..4 {
            stats.record_frame();
            std::thread::sleep(Duration::from_millis(100));
        }

        let rate = stats.current_rate();
        assert!(
            rate > 5.0 && rate < 15.0,
            "rate should be around 10, got {}",
            rate
        );
    }

    #[test]
    fn test_percentile_stats() {
        let mut stats = StatsCollector::new(Duration::from_secs(10));

        // 100サンプルの処理時間を記録
        for i in 0..100 {
            stats.record_duration(StatKind::Track, Duration::from_millis(i));
        }

        let percentile = stats.percentile_stats(StatKind::Track).unwrap();
        assert_eq!(percentile.count, 100);
        assert!(percentile.p50.as_millis() >= 45 && percentile.p50.as_millis() <= 55);
        assert!(percentile.p95.as_millis() >= 90 && percentile.p95.as_millis() <= 99);
        assert_eq!(percentile.p99.as_millis(), 99);
    }

    #[test]
    fn test_percentile_stats_empty() {
        let stats = StatsCollector::new(Duration::from_secs(10));
        assert!(stats.percentile_stats(StatKind::Capture).is_none());
    }

    #[test]
    fn test_transmission_count() {
        let mut stats = StatsCollector::new(Duration::from_secs(10));

        stats.record_transmission();
        stats.record_transmission();

        assert_eq!(stats.transmission_count(), 2);
    }

    #[test]
    fn test_should_report() {
        let stats = StatsCollector::new(Duration::from_millis(100));

        assert!(!stats.should_report());

        std::thread::sleep(Duration::from_millis(150));

        assert!(stats.should_report());
    }
}
