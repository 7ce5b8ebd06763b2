/// シリアル通信アダプタ
///
/// serialportクレートを使用したシリアルリンクの実装。
/// ポート列挙・オープン・書き込み・クローズを担う。
/// 状態遷移は Closed -> Open -> Streaming -> Closed（終端）で、
/// 書き込み失敗後の自動再接続は行わない。

use crate::domain::{DomainError, DomainResult, PortDescriptor, SerialLinkPort};
use serialport::{SerialPort, SerialPortType};
use std::io::Write;
use std::time::Duration;

/// 利用可能なシリアルポートを列挙する
///
/// OSへの問い合わせのみで副作用はない。
///
/// # Returns
/// - `Ok(Vec<PortDescriptor>)`: 列挙結果（0件でも成功）
/// - `Err(DomainError::Link)`: OS呼び出しの失敗
pub fn enumerate_ports() -> DomainResult<Vec<PortDescriptor>> {
    let ports = serialport::available_ports()
        .map_err(|e| DomainError::Link(format!("Failed to enumerate serial ports: {}", e)))?;

    Ok(ports
        .into_iter()
        .map(|info| {
            let description = match info.port_type {
                SerialPortType::UsbPort(usb) => {
                    usb.product.unwrap_or_else(|| "USB Serial".to_string())
                }
                SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                SerialPortType::PciPort => "PCI".to_string(),
                SerialPortType::Unknown => String::new(),
            };
            PortDescriptor::new(info.port_name, description)
        })
        .collect())
}

/// シリアル通信アダプタ
///
/// プロセスの生存期間中、開くポートは最大1つ。
pub struct SerialLinkAdapter {
    /// ポートハンドル（Noneはクローズ済み）
    port: Option<Box<dyn SerialPort>>,
    port_name: String,
}

impl SerialLinkAdapter {
    /// 書き込みタイムアウト（ミリ秒）
    ///
    /// 9600ボーで2バイトのペイロードには十分すぎる値
    pub const WRITE_TIMEOUT_MS: u64 = 1000;

    /// ポートを開く
    ///
    /// # Arguments
    /// - `port_name`: ポート名（例: "COM2", "/dev/ttyUSB0"）
    /// - `baud_rate`: ボーレート（既定は9600、8N1）
    ///
    /// # Returns
    /// - `Ok(SerialLinkAdapter)`: Open状態のアダプタ
    /// - `Err(DomainError::Link)`: ドライバ層の失敗（使用中、権限なし、存在しないパス等）
    pub fn open(port_name: &str, baud_rate: u32) -> DomainResult<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(Self::WRITE_TIMEOUT_MS))
            .open()
            .map_err(|e| {
                DomainError::Link(format!("Failed to open {}: {}", port_name, e))
            })?;

        tracing::info!("Serial port opened: {} @ {} baud", port_name, baud_rate);

        Ok(Self {
            port: Some(port),
            port_name: port_name.to_string(),
        })
    }

    /// ポート名を取得
    #[allow(dead_code)]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl SerialLinkPort for SerialLinkAdapter {
    /// ペイロードをワイヤへ書き込む
    ///
    /// 失敗時はハンドルを破棄してClosed状態へ遷移する。
    /// デバイスはオペレータの介入が必要と見なし、再試行しない。
    fn send_bytes(&mut self, payload: &[u8]) -> DomainResult<()> {
        let result = match self.port.as_mut() {
            Some(port) => port.write_all(payload).and_then(|()| port.flush()),
            None => {
                return Err(DomainError::Link(format!(
                    "Port {} is not open",
                    self.port_name
                )))
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                self.port = None;
                Err(DomainError::Link(format!(
                    "Write to {} failed: {}",
                    self.port_name, e
                )))
            }
        }
    }

    /// ポートを閉じる
    ///
    /// 冪等。未オープン・クローズ済みでも安全。
    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!("Serial port closed: {}", self.port_name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialLinkAdapter {
    fn drop(&mut self) {
        self.close();
    }
}
