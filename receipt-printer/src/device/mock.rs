//! Scripted in-memory device for tests

use std::sync::{Arc, Mutex};

use super::{DeviceSession, PrinterDevice};
use crate::error::{PrintError, PrintResult};

/// One successful call on a mock session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(usize),
    Init,
    Cut(u8),
    Text(String),
    Lf(u8),
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    SetTextSize(u8, u8),
    Raw(Vec<u8>),
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    opens: usize,
    fail_opens: usize,
    fail_ops: usize,
}

/// Device whose sessions record calls and fail on demand
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    script: Arc<Mutex<Script>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` session operations (`init` is never failed)
    pub fn fail_ops(&self, n: usize) {
        self.script.lock().unwrap().fail_ops = n;
    }

    /// Fail the next `n` open attempts
    pub fn fail_opens(&self, n: usize) {
        self.script.lock().unwrap().fail_opens = n;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }

    /// Successful opens so far
    pub fn opens(&self) -> usize {
        self.script.lock().unwrap().opens
    }

    /// Printed text lines, in order
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl PrinterDevice for MockDevice {
    type Session = MockSession;

    async fn open(&mut self) -> PrintResult<MockSession> {
        let mut script = self.script.lock().unwrap();
        if script.fail_opens > 0 {
            script.fail_opens -= 1;
            return Err(PrintError::Connection("device not found".into()));
        }
        script.opens += 1;
        let id = script.opens;
        script.calls.push(Call::Open(id));
        Ok(MockSession {
            script: self.script.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockSession {
    script: Arc<Mutex<Script>>,
}

impl MockSession {
    fn record(&self, call: Call) -> PrintResult<()> {
        let mut script = self.script.lock().unwrap();
        if script.fail_ops > 0 && call != Call::Init {
            script.fail_ops -= 1;
            return Err(PrintError::Offline("pipe error".into()));
        }
        script.calls.push(call);
        Ok(())
    }
}

impl DeviceSession for MockSession {
    async fn init(&mut self) -> PrintResult<()> {
        self.record(Call::Init)
    }

    async fn cut(&mut self, feed: u8) -> PrintResult<()> {
        self.record(Call::Cut(feed))
    }

    async fn text(&mut self, text: &str) -> PrintResult<()> {
        self.record(Call::Text(text.to_string()))
    }

    async fn lf(&mut self, lines: u8) -> PrintResult<()> {
        self.record(Call::Lf(lines))
    }

    async fn justify_left(&mut self) -> PrintResult<()> {
        self.record(Call::JustifyLeft)
    }

    async fn justify_center(&mut self) -> PrintResult<()> {
        self.record(Call::JustifyCenter)
    }

    async fn justify_right(&mut self) -> PrintResult<()> {
        self.record(Call::JustifyRight)
    }

    async fn set_text_size(&mut self, width: u8, height: u8) -> PrintResult<()> {
        self.record(Call::SetTextSize(width, height))
    }

    async fn raw_write(&mut self, bytes: &[u8]) -> PrintResult<()> {
        self.record(Call::Raw(bytes.to_vec()))
    }
}
