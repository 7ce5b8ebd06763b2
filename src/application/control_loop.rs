//! 制御ループモジュール
//!
//! フレーム取得 → ランドマーク検出 → 距離計測 → レベル変換 →
//! デバウンス送信 → 表示 → スロットル、を単一スレッドで毎イテレーション
//! 順に実行します。並列化や協調スケジューリングは行わず、すべての状態は
//! このループが排他的に所有します。

use crate::application::{
    extension, geometry, scale,
    stats::{StatKind, StatsCollector},
    transmitter::LevelTransmitter,
};
use crate::domain::{
    DisplayPort, DomainResult, FingerName, FrameSourcePort, GestureConfig, GestureOverlay,
    HandTrackerPort, HudState, LoopSignal, PipelineConfig, SerialLinkPort,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 制御ループ設定
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// 距離を測る指の組
    pub finger_a: FingerName,
    pub finger_b: FingerName,
    /// スケーリングの距離レンジ
    pub min_distance: f64,
    pub max_distance: f64,
    /// 1イテレーションの目標周期
    pub target_period: Duration,
    /// 統計出力間隔
    pub stats_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            finger_a: FingerName::Thumb,
            finger_b: FingerName::Index,
            min_distance: GestureConfig::DEFAULT_MIN_DISTANCE,
            max_distance: GestureConfig::DEFAULT_MAX_DISTANCE,
            target_period: Duration::from_secs_f64(
                1.0 / PipelineConfig::DEFAULT_TARGET_FPS as f64,
            ),
            stats_interval: Duration::from_secs(PipelineConfig::DEFAULT_STATS_INTERVAL_SEC),
        }
    }
}

/// 制御ループ実行コンテキスト
pub struct ControlLoop<F, T, D, L>
where
    F: FrameSourcePort,
    T: HandTrackerPort,
    D: DisplayPort,
    L: SerialLinkPort,
{
    frames: F,
    tracker: T,
    display: D,
    transmitter: LevelTransmitter<L>,
    config: LoopConfig,
    stats: StatsCollector,
    running: Arc<AtomicBool>,
}

impl<F, T, D, L> ControlLoop<F, T, D, L>
where
    F: FrameSourcePort,
    T: HandTrackerPort,
    D: DisplayPort,
    L: SerialLinkPort,
{
    /// 新しいControlLoopを作成
    ///
    /// # Arguments
    /// - `running`: 割り込みフラグ（falseで次イテレーション開始時に停止）
    pub fn new(
        frames: F,
        tracker: T,
        display: D,
        link: L,
        config: LoopConfig,
        running: Arc<AtomicBool>,
    ) -> Self {
        let stats = StatsCollector::new(config.stats_interval);
        Self {
            frames,
            tracker,
            display,
            transmitter: LevelTransmitter::new(link),
            config,
            stats,
            running,
        }
    }

    /// ループを起動する（ブロッキング）
    ///
    /// 終了条件: 終了キー、フレーム取得失敗、割り込み、送信失敗。
    /// どの経路で終了しても、終了処理はちょうど1回だけ実行される。
    pub fn run(mut self) -> DomainResult<()> {
        let result = self.run_inner();
        self.shutdown();
        result
    }

    fn run_inner(&mut self) -> DomainResult<()> {
        loop {
            // 割り込みチェックはイテレーション毎に1回。
            // 実行中のブロッキング呼び出しは中断せず、自然に完了・失敗させる。
            if !self.running.load(Ordering::Relaxed) {
                tracing::info!("Interrupt received, stopping loop");
                return Ok(());
            }

            let iteration_start = Instant::now();

            let frame = self.frames.next_frame()?;
            let captured = frame.timestamp;

            let observation = self.tracker.detect(&frame)?;
            let tracked = Instant::now();

            let fingers =
                geometry::all_finger_positions(observation.as_ref(), frame.width, frame.height);
            let extension = extension::extended_count(&fingers);

            let span = scale::fingertip_span(
                observation.as_ref(),
                frame.width,
                frame.height,
                self.config.finger_a,
                self.config.finger_b,
            );

            let mut hud = HudState {
                overlay: None,
                extension,
            };

            match span {
                Some(span) => {
                    let level = scale::map_distance_to_scale(
                        span.distance,
                        self.config.min_distance,
                        self.config.max_distance,
                    );
                    if self.transmitter.send(level)? {
                        self.stats.record_transmission();
                    }
                    hud.overlay = Some(GestureOverlay {
                        tip_a: span.tip_a,
                        tip_b: span.tip_b,
                        level,
                    });
                }
                None => {
                    // 手なしはエラーではない。このイテレーションは送信なし
                    self.stats.record_detection_gap();
                }
            }
            let judged = Instant::now();

            if self.display.present(&frame, &hud)? == LoopSignal::Quit {
                tracing::info!("Quit requested");
                return Ok(());
            }

            self.stats.record_frame();
            self.stats
                .record_duration(StatKind::Capture, captured.duration_since(iteration_start));
            self.stats
                .record_duration(StatKind::Track, tracked.duration_since(captured));
            self.stats
                .record_duration(StatKind::Transmit, judged.duration_since(tracked));
            self.stats
                .record_duration(StatKind::EndToEnd, judged.duration_since(iteration_start));
            if self.stats.should_report() {
                self.stats.report_and_reset();
            }

            // 目標レートへのスロットル: 残余時間だけスリープ
            if let Some(residual) = self
                .config
                .target_period
                .checked_sub(iteration_start.elapsed())
            {
                std::thread::sleep(residual);
            }
        }
    }

    /// 単一の終了処理パス
    ///
    /// 正常終了・エラー・割り込みのすべてがここへ合流する。
    /// カメラとトラッカーの解放は各アダプタのDropが担う。
    fn shutdown(&mut self) {
        self.transmitter.close();
        self.display.close();
        tracing::info!("Control loop resources released");
    }
}
