//! 制御ループ統合テスト
//!
//! 合成した手の観測列をスクリプトトラッカーで供給し、
//! ワイヤへの書き込み列をエンドツーエンドで検証します。

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use PinchDial::application::control_loop::{ControlLoop, LoopConfig};
use PinchDial::domain::{
    DisplayPort, DomainResult, Frame, FrameSourcePort, HandObservation, HudState, Landmark,
    LoopSignal, SerialLinkPort, LANDMARK_COUNT,
};
use PinchDial::infrastructure::scripted_tracker::ScriptedTracker;

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// 親指と人差し指の指先が指定ピクセル距離になる合成観測を作成
fn observation_with_distance(distance_px: f64) -> HandObservation {
    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    landmarks[4] = Landmark::new(0.0, 0.0, 0.0);
    landmarks[8] = Landmark::new(distance_px as f32 / FRAME_WIDTH as f32, 0.0, 0.0);
    HandObservation::new(landmarks, 0.9)
}

/// 一定サイズのフレームを供給し続けるフレームソース
struct StaticFrames;

impl FrameSourcePort for StaticFrames {
    fn next_frame(&mut self) -> DomainResult<Frame> {
        Ok(Frame::new(
            vec![0u8; (FRAME_WIDTH * FRAME_HEIGHT * 3) as usize],
            FRAME_WIDTH,
            FRAME_HEIGHT,
        ))
    }
}

/// 書き込み列を記録するリンク
struct RecordingLink {
    writes: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl SerialLinkPort for RecordingLink {
    fn send_bytes(&mut self, payload: &[u8]) -> DomainResult<()> {
        self.writes.borrow_mut().push(payload.to_vec());
        Ok(())
    }

    fn close(&mut self) {}

    fn is_open(&self) -> bool {
        true
    }
}

/// 指定回数presentしたら終了要求を返す表示
struct CountingDisplay {
    quit_after: u32,
    presented: u32,
}

impl DisplayPort for CountingDisplay {
    fn present(&mut self, _frame: &Frame, _hud: &HudState) -> DomainResult<LoopSignal> {
        self.presented += 1;
        if self.presented >= self.quit_after {
            Ok(LoopSignal::Quit)
        } else {
            Ok(LoopSignal::Continue)
        }
    }

    fn close(&mut self) {}
}

fn run_scripted(script: Vec<Option<HandObservation>>) -> Vec<Vec<u8>> {
    let writes = Rc::new(RefCell::new(Vec::new()));
    let link = RecordingLink {
        writes: Rc::clone(&writes),
    };

    let iterations = script.len() as u32;
    let control = ControlLoop::new(
        StaticFrames,
        ScriptedTracker::new(script),
        CountingDisplay {
            quit_after: iterations,
            presented: 0,
        },
        link,
        LoopConfig {
            target_period: Duration::ZERO,
            ..LoopConfig::default()
        },
        Arc::new(AtomicBool::new(true)),
    );

    control.run().expect("loop should terminate cleanly");

    let recorded = writes.borrow().clone();
    recorded
}

#[test]
fn scripted_distances_transmit_expected_levels() {
    // 距離 10 / 60 / 205 ピクセル → レベル 0 / 1 / 5
    // 各レベルが直前の値と異なるため、ちょうど3回書き込まれる
    // （初期状態は「前回値なし」なので最初のレベル0も書き込まれる）
    let writes = run_scripted(vec![
        Some(observation_with_distance(10.0)),
        Some(observation_with_distance(60.0)),
        Some(observation_with_distance(205.0)),
    ]);

    assert_eq!(
        writes,
        vec![b"0\n".to_vec(), b"1\n".to_vec(), b"5\n".to_vec()]
    );
}

#[test]
fn unchanged_level_and_gaps_do_not_retransmit() {
    // 同一レベルの継続と手なしフレームはワイヤに現れない
    let writes = run_scripted(vec![
        Some(observation_with_distance(60.0)),
        Some(observation_with_distance(61.0)), // 同じレベル1
        None,                                  // 手なし
        Some(observation_with_distance(205.0)),
        Some(observation_with_distance(250.0)), // 同じレベル5（飽和）
    ]);

    assert_eq!(writes, vec![b"1\n".to_vec(), b"5\n".to_vec()]);
}

#[test]
fn saturation_at_both_ends() {
    // レンジ外の距離は両端のレベルに飽和する
    let writes = run_scripted(vec![
        Some(observation_with_distance(1.0)),
        Some(observation_with_distance(400.0)),
    ]);

    assert_eq!(writes, vec![b"0\n".to_vec(), b"5\n".to_vec()]);
}
