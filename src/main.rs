mod application;
mod domain;
mod infrastructure;
mod logging;

use crate::application::control_loop::{ControlLoop, LoopConfig};
use crate::domain::config::AppConfig;
use crate::domain::ports::select_port;
use crate::infrastructure::camera::CameraFrameSource;
use crate::infrastructure::display::PreviewDisplay;
use crate::infrastructure::mediapipe_tracker::MediaPipeTracker;
use crate::infrastructure::serial_link::{enumerate_ports, SerialLinkAdapter};
use crate::logging::init_logging;
use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("PinchDial starting...");

    match run() {
        Ok(_) => {
            tracing::info!("PinchDial terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Gesture: {}-{} distance, range {}-{} px",
        config.gesture.finger_a,
        config.gesture.finger_b,
        config.gesture.min_distance,
        config.gesture.max_distance
    );
    tracing::info!(
        "Serial: {} baud, Loop: {} it/s target",
        config.serial.baud_rate,
        config.pipeline.target_fps
    );

    // ポート列挙と選択（ハードウェアに触れる前に確定させる）
    let available = enumerate_ports().context("Serial port enumeration failed")?;
    println!("Available serial ports:");
    for port in &available {
        println!("- {}", port);
    }

    let suffix = match &config.serial.port_suffix {
        Some(suffix) => {
            tracing::info!("Port suffix preset in config: {}", suffix);
            suffix.clone()
        }
        None => prompt_port_suffix()?,
    };
    let port_name = select_port(&suffix, &available)?;
    println!("Using port: {}", port_name);

    // シリアルポートのオープン
    let link = SerialLinkAdapter::open(&port_name, config.serial.baud_rate)?;

    // カメラの初期化
    tracing::info!("Initializing camera {}...", config.camera.device_index);
    let frames = CameraFrameSource::new(config.camera.device_index)?;

    // ハンドトラッカーの起動
    tracing::info!("Starting hand tracker subprocess...");
    let tracker = MediaPipeTracker::spawn(&config.tracker)?;

    // プレビュー表示
    let display = PreviewDisplay::new();

    // Ctrl-Cで停止フラグを降ろす（ループがイテレーション毎に確認する）
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::Relaxed);
        })
        .context("Failed to set interrupt handler")?;
    }

    let loop_config = LoopConfig {
        finger_a: config.gesture.finger_a,
        finger_b: config.gesture.finger_b,
        min_distance: config.gesture.min_distance,
        max_distance: config.gesture.max_distance,
        target_period: config.pipeline.target_period(),
        stats_interval: config.pipeline.stats_interval(),
    };

    tracing::info!("Starting control loop (press 'q' in the preview window to quit)");

    // 制御ループの起動（ブロッキング）
    let control = ControlLoop::new(frames, tracker, display, link, loop_config, running);
    control.run()?;

    Ok(())
}

/// 操作者にポート番号サフィックスを入力させる
fn prompt_port_suffix() -> anyhow::Result<String> {
    print!("Select port number: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read port selection")?;

    Ok(input.trim().to_string())
}
