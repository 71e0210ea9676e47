//! ESC/POS device over TCP or a character device

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use super::{DeviceDescriptor, DeviceSession, PrinterDevice};
use crate::config::{DEFAULT_CONNECT_TIMEOUT, PrinterConfig};
use crate::error::{PrintError, PrintResult};
use crate::escpos::EscPosBuilder;

type Sink = Box<dyn AsyncWrite + Send + Unpin>;

/// Epson-compatible printer
///
/// Each [`open`](PrinterDevice::open) creates a brand-new connection; nothing
/// from a previous session is reused.
#[derive(Debug, Clone)]
pub struct EscPosDevice {
    descriptor: DeviceDescriptor,
    timeout: Duration,
}

impl EscPosDevice {
    pub fn new(descriptor: DeviceDescriptor) -> Self {
        Self {
            descriptor,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Build from configuration (descriptor and connect timeout)
    pub fn from_config(config: &PrinterConfig) -> PrintResult<Self> {
        Ok(Self::new(config.device_descriptor()?).with_timeout(config.connect_timeout))
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }
}

impl PrinterDevice for EscPosDevice {
    type Session = EscPosSession;

    #[instrument(skip(self), fields(device = %self.descriptor))]
    async fn open(&mut self) -> PrintResult<EscPosSession> {
        info!("Connecting to printer");

        let sink: Sink = match &self.descriptor {
            DeviceDescriptor::Network(addr) => {
                let stream = tokio::time::timeout(self.timeout, TcpStream::connect(*addr))
                    .await
                    .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", addr)))?
                    .map_err(|e| PrintError::Connection(format!("{}: {}", addr, e)))?;
                stream.set_nodelay(true)?;
                Box::new(stream)
            }
            DeviceDescriptor::Character(path) => {
                let file = tokio::fs::OpenOptions::new()
                    .write(true)
                    .open(path)
                    .await
                    .map_err(|e| PrintError::Connection(format!("{}: {}", path.display(), e)))?;
                Box::new(file)
            }
        };

        info!("Connected");
        Ok(EscPosSession { sink })
    }
}

/// Live ESC/POS session
///
/// Every call is encoded, written and flushed before it returns, so a dead
/// connection surfaces as an error on the call that hit it.
pub struct EscPosSession {
    sink: Sink,
}

impl fmt::Debug for EscPosSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscPosSession").finish_non_exhaustive()
    }
}

impl EscPosSession {
    async fn send(&mut self, b: EscPosBuilder) -> PrintResult<()> {
        let data = b.build();
        debug!(len = data.len(), "writing");
        self.sink.write_all(&data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;
        self.sink.flush().await?;
        Ok(())
    }

    async fn with(&mut self, f: impl FnOnce(&mut EscPosBuilder)) -> PrintResult<()> {
        let mut b = EscPosBuilder::new();
        f(&mut b);
        self.send(b).await
    }
}

impl DeviceSession for EscPosSession {
    async fn init(&mut self) -> PrintResult<()> {
        self.with(|b| {
            b.init();
        })
        .await
    }

    async fn cut(&mut self, feed: u8) -> PrintResult<()> {
        self.with(|b| {
            b.cut_feed(feed);
        })
        .await
    }

    async fn text(&mut self, text: &str) -> PrintResult<()> {
        self.with(|b| {
            b.line(text);
        })
        .await
    }

    async fn lf(&mut self, lines: u8) -> PrintResult<()> {
        self.with(|b| {
            b.feed(lines);
        })
        .await
    }

    async fn justify_left(&mut self) -> PrintResult<()> {
        self.with(|b| {
            b.left();
        })
        .await
    }

    async fn justify_center(&mut self) -> PrintResult<()> {
        self.with(|b| {
            b.center();
        })
        .await
    }

    async fn justify_right(&mut self) -> PrintResult<()> {
        self.with(|b| {
            b.right();
        })
        .await
    }

    async fn set_text_size(&mut self, width: u8, height: u8) -> PrintResult<()> {
        self.with(|b| {
            b.text_size(width, height);
        })
        .await
    }

    async fn raw_write(&mut self, bytes: &[u8]) -> PrintResult<()> {
        self.with(|b| {
            b.raw(bytes);
        })
        .await
    }
}
