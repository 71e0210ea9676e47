//! Printer device interface
//!
//! The connection manager talks to hardware only through these two traits:
//! a [`PrinterDevice`] opens sessions, a [`DeviceSession`] performs the
//! primitive printer calls. Any error returned by either is a transient
//! device fault.
//!
//! [`EscPosDevice`] is the production implementation for Epson-compatible
//! printers reachable over TCP (port 9100) or a character device such as
//! the Linux `usblp` node `/dev/usb/lp0`.

mod escpos;
#[cfg(test)]
pub(crate) mod mock;

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PrintError, PrintResult};

pub use escpos::{EscPosDevice, EscPosSession};

/// Raw TCP printing port used by most thermal printers
pub const DEFAULT_RAW_PORT: u16 = 9100;

/// Opens printer sessions
#[allow(async_fn_in_trait)]
pub trait PrinterDevice {
    type Session: DeviceSession;

    /// Open a fresh session; the previous one (if any) is simply dropped
    async fn open(&mut self) -> PrintResult<Self::Session>;
}

/// Primitive printer operations on a live session
#[allow(async_fn_in_trait)]
pub trait DeviceSession {
    /// Reset the printer to its power-on state
    async fn init(&mut self) -> PrintResult<()>;

    /// Feed `feed` lines, then cut
    async fn cut(&mut self, feed: u8) -> PrintResult<()>;

    /// Print `text` followed by a line feed
    async fn text(&mut self, text: &str) -> PrintResult<()>;

    /// Feed `lines` lines
    async fn lf(&mut self, lines: u8) -> PrintResult<()>;

    async fn justify_left(&mut self) -> PrintResult<()>;

    async fn justify_center(&mut self) -> PrintResult<()>;

    async fn justify_right(&mut self) -> PrintResult<()>;

    /// Character magnification steps, 0 = normal
    async fn set_text_size(&mut self, width: u8, height: u8) -> PrintResult<()>;

    /// Write control bytes verbatim
    async fn raw_write(&mut self, bytes: &[u8]) -> PrintResult<()>;
}

/// Where a printer can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceDescriptor {
    /// Raw TCP socket, usually port 9100
    Network(SocketAddr),
    /// Character device opened for writing, e.g. `/dev/usb/lp0`
    Character(PathBuf),
}

impl FromStr for DeviceDescriptor {
    type Err = PrintError;

    /// Accepts `tcp://host[:port]`, `host:port` or an absolute path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PrintError::InvalidDescriptor("empty descriptor".into()));
        }

        if s.starts_with('/') {
            return Ok(Self::Character(PathBuf::from(s)));
        }

        let (host_port, explicit_tcp) = match s.strip_prefix("tcp://") {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let with_port = if host_port.contains(':') {
            host_port.to_string()
        } else if explicit_tcp {
            format!("{}:{}", host_port, DEFAULT_RAW_PORT)
        } else {
            return Err(PrintError::InvalidDescriptor(s.to_string()));
        };

        if let Ok(addr) = with_port.parse::<SocketAddr>() {
            return Ok(Self::Network(addr));
        }

        with_port
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .map(Self::Network)
            .ok_or_else(|| PrintError::InvalidDescriptor(s.to_string()))
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(addr) => write!(f, "tcp://{}", addr),
            Self::Character(path) => write!(f, "{}", path.display()),
        }
    }
}
