//! Printer configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | PRINTER_DEVICE | tcp://127.0.0.1:9100 | device descriptor |
//! | PRINTER_WIDTH | 48 | characters per line |
//! | PRINTER_LINE_CHAR | # | fill character for horizontal rules |
//! | PRINTER_CONNECT_TIMEOUT_MS | 5000 | connect timeout |
//! | PRINTER_RETRY_DELAY_MS | 20000 | backoff between retries |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceDescriptor;
use crate::error::{PrintError, PrintResult};

/// Characters per line on 80mm paper
pub const DEFAULT_PRINT_WIDTH: usize = 48;
/// Fill character for horizontal rules
pub const DEFAULT_LINE_CHAR: char = '#';
/// Wait between a failure and the reconnect attempt
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(20);
/// Connect timeout for network devices
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Backoff policy for the resilient dispatch loop
///
/// Retries are unbounded; only the wait between attempts is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Retry without waiting (tests)
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

/// Printer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Where the printer lives, e.g. `tcp://192.168.1.50:9100` or `/dev/usb/lp0`
    pub descriptor: String,
    /// Characters per line
    pub print_width: usize,
    /// Fill character for horizontal rules
    pub line_char: char,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            descriptor: "tcp://127.0.0.1:9100".into(),
            print_width: DEFAULT_PRINT_WIDTH,
            line_char: DEFAULT_LINE_CHAR,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl PrinterConfig {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            descriptor: std::env::var("PRINTER_DEVICE").unwrap_or(defaults.descriptor),
            print_width: std::env::var("PRINTER_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.print_width),
            line_char: std::env::var("PRINTER_LINE_CHAR")
                .ok()
                .and_then(|v| v.chars().next())
                .unwrap_or(defaults.line_char),
            connect_timeout: std::env::var("PRINTER_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            retry: std::env::var("PRINTER_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|ms| RetryPolicy::new(Duration::from_millis(ms)))
                .unwrap_or(defaults.retry),
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> PrintResult<Self> {
        serde_json::from_str(json).map_err(|e| PrintError::InvalidConfig(e.to_string()))
    }

    /// Parse the configured descriptor
    pub fn device_descriptor(&self) -> PrintResult<DeviceDescriptor> {
        self.descriptor.parse()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
