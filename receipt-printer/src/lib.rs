//! # receipt-printer
//!
//! Resilient ESC/POS receipt printing.
//!
//! ## Scope
//!
//! - A connection manager that survives the printer going away: every call
//!   is retried (backoff, reconnect, retry) until it succeeds, and the
//!   upside-down setting is restored on each new session
//! - A command queue that buffers a receipt and replays it, reversed when
//!   the printer is mounted upside down
//! - ASCII charts and key/value tables sized to the paper width
//! - ESC/POS encoding for TCP (port 9100) and `usblp` character devices
//!
//! ## Example
//!
//! ```ignore
//! use receipt_printer::{CommandQueue, ConnectionManager, EscPosDevice, Justify, PrinterConfig};
//!
//! let config = PrinterConfig::from_env();
//! let device = EscPosDevice::from_config(&config)?;
//! let printer = ConnectionManager::connected(device, &config).await;
//!
//! let mut receipt = CommandQueue::with_orientation(printer, true).await;
//! receipt.text("Daily report", Some(Justify::Center), Some(1));
//! receipt.line();
//! receipt.print_table(&[("Orders", 42), ("Revenue", 1234)], 0);
//! receipt.print_chart(&[3.0, 5.0, 4.0, 8.0], 10)?;
//! receipt.print_and_cut().await;
//! ```

pub mod chart;
pub mod command;
pub mod config;
pub mod connection;
pub mod device;
mod encoding;
mod error;
pub mod escpos;
pub mod logger;
pub mod queue;
pub mod table;

// Re-exports
pub use chart::{ChartRenderer, NormalizedChart};
pub use command::{Command, Justify};
pub use config::{PrinterConfig, RetryPolicy};
pub use connection::{
    ConnectionManager, ConnectionStats, LinkState, PrinterState, RetryEvent, RetryPhase,
};
pub use device::{DeviceDescriptor, DeviceSession, EscPosDevice, EscPosSession, PrinterDevice};
pub use encoding::{encode_text, pad_left, text_width};
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use queue::CommandQueue;
pub use table::TableRenderer;
