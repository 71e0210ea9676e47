//! Resilient printer connection
//!
//! [`ConnectionManager`] owns the device session and makes every printer
//! call eventually succeed: a failed call is logged, followed by a fixed
//! backoff, a reconnect, and a retry of the same call. Retries are unbounded
//! and errors never reach the caller.
//!
//! Orientation is part of [`PrinterState`] and is written to every new
//! session before anything else runs on it. Smoothing is not persisted.

use tracing::{error, info, instrument, warn};

use crate::command::{DEFAULT_CUT_FEED, Justify};
use crate::config::{DEFAULT_LINE_CHAR, DEFAULT_PRINT_WIDTH, PrinterConfig, RetryPolicy};
use crate::device::{DeviceSession, PrinterDevice};
use crate::error::{PrintError, PrintResult};
use crate::escpos::{SMOOTHING_OFF, SMOOTHING_ON, UPSIDE_DOWN_OFF, UPSIDE_DOWN_ON};

/// Settings that outlive any single device session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterState {
    /// Characters per line
    pub print_width: usize,
    /// Fill character for horizontal rules
    pub line_char: char,
    /// Upside-down mode, re-applied after every reconnect
    pub upside_down: bool,
}

impl Default for PrinterState {
    fn default() -> Self {
        Self {
            print_width: DEFAULT_PRINT_WIDTH,
            line_char: DEFAULT_LINE_CHAR,
            upside_down: false,
        }
    }
}

/// Session lifecycle
///
/// `Connecting` is held for the whole reconnect loop. The loop talks to the
/// device directly and never re-enters [`ConnectionManager::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Which step failed before a backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// Opening, initializing or restoring orientation on a session
    Connect,
    /// A printer call on a live session
    Operation,
}

/// Passed to the retry hook before every backoff sleep
#[derive(Debug)]
pub struct RetryEvent<'a> {
    pub phase: RetryPhase,
    /// Consecutive failures in this phase, starting at 1
    pub attempt: u32,
    pub error: &'a PrintError,
}

/// Lifetime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Sessions successfully opened
    pub connects: u64,
    /// Failed device calls, connect attempts included
    pub failures: u64,
}

type RetryHook = Box<dyn FnMut(&RetryEvent<'_>) + Send>;

/// Owns the printer session and retries every call until it succeeds
pub struct ConnectionManager<D: PrinterDevice> {
    device: D,
    session: Option<D::Session>,
    state: PrinterState,
    link: LinkState,
    retry: RetryPolicy,
    hook: Option<RetryHook>,
    stats: ConnectionStats,
}

impl<D: PrinterDevice> ConnectionManager<D> {
    /// Create a disconnected manager; the first call connects lazily
    pub fn new(device: D, config: &PrinterConfig) -> Self {
        Self {
            device,
            session: None,
            state: PrinterState {
                print_width: config.print_width,
                line_char: config.line_char,
                upside_down: false,
            },
            link: LinkState::Disconnected,
            retry: config.retry,
            hook: None,
            stats: ConnectionStats::default(),
        }
    }

    /// Create and connect, retrying until the device answers
    pub async fn connected(device: D, config: &PrinterConfig) -> Self {
        let mut manager = Self::new(device, config);
        manager.connect().await;
        manager
    }

    /// Called before every backoff sleep
    pub fn with_retry_hook(mut self, hook: impl FnMut(&RetryEvent<'_>) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> &PrinterState {
        &self.state
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn is_connected(&self) -> bool {
        self.link == LinkState::Connected
    }

    pub fn stats(&self) -> ConnectionStats {
        self.stats
    }

    pub fn set_print_width(&mut self, columns: usize) {
        self.state.print_width = columns;
    }

    pub fn set_line_char(&mut self, c: char) {
        self.state.line_char = c;
    }

    // === Session management ===

    /// Replace the session with a fresh one
    ///
    /// Loops until a session opens, initializes, and has the persisted
    /// orientation applied. The old session is dropped without closing.
    #[instrument(skip(self))]
    pub async fn connect(&mut self) {
        debug_assert_ne!(self.link, LinkState::Connecting, "connect re-entered");
        self.session = None;
        self.link = LinkState::Connecting;
        let mut attempt = 0;

        loop {
            match self.open_session().await {
                Ok(session) => {
                    self.session = Some(session);
                    self.link = LinkState::Connected;
                    self.stats.connects += 1;
                    info!(upside_down = self.state.upside_down, "Printer connected");
                    return;
                }
                Err(e) => {
                    attempt += 1;
                    self.stats.failures += 1;
                    error!(error = %e, attempt, "Printer connect failed");
                    self.backoff(RetryPhase::Connect, attempt, &e).await;
                }
            }
        }
    }

    async fn open_session(&mut self) -> PrintResult<D::Session> {
        let mut session = self.device.open().await?;
        session.init().await?;
        if self.state.upside_down {
            session.raw_write(UPSIDE_DOWN_ON).await?;
        }
        Ok(session)
    }

    async fn backoff(&mut self, phase: RetryPhase, attempt: u32, error: &PrintError) {
        if let Some(hook) = self.hook.as_mut() {
            hook(&RetryEvent {
                phase,
                attempt,
                error,
            });
        }
        let delay_ms = u64::try_from(self.retry.delay.as_millis()).unwrap_or(u64::MAX);
        warn!(delay_ms, "Waiting before reconnecting");
        tokio::time::sleep(self.retry.delay).await;
    }

    /// Run `op` on the session until it succeeds
    ///
    /// On failure the session is discarded; after the backoff a new one is
    /// opened and `op` runs again from the start.
    pub async fn run_resilient<T, F>(&mut self, mut op: F) -> T
    where
        F: AsyncFnMut(&mut D::Session) -> PrintResult<T>,
    {
        let mut attempt = 0;

        loop {
            if self.session.is_none() {
                info!("Reconnecting");
                self.connect().await;
            }
            let Some(session) = self.session.as_mut() else {
                continue;
            };

            let result = op(session).await;
            match result {
                Ok(value) => return value,
                Err(e) => {
                    attempt += 1;
                    self.stats.failures += 1;
                    self.session = None;
                    self.link = LinkState::Disconnected;
                    error!(error = %e, attempt, "Printer operation failed");
                    self.backoff(RetryPhase::Operation, attempt, &e).await;
                }
            }
        }
    }

    // === Printer operations ===

    /// Feed `feed` lines and cut
    pub async fn cut(&mut self, feed: u8) {
        self.run_resilient(async |s| s.cut(feed).await).await
    }

    /// Print one line, optionally aligned; alignment reverts to left after
    pub async fn print(&mut self, text: &str, justify: Option<Justify>) {
        if let Some(side) = justify {
            self.justify(side).await;
        }

        self.run_resilient(async |s| s.text(text).await).await;

        if justify.is_some() {
            self.justify(Justify::Left).await;
        }
    }

    pub async fn feed(&mut self, lines: u8) {
        self.run_resilient(async |s| s.lf(lines).await).await
    }

    /// Print a full-width rule of `symbol`, or of the configured fill character
    pub async fn print_fill_line(&mut self, symbol: Option<char>) {
        let symbol = symbol.unwrap_or(self.state.line_char);
        let rule: String = std::iter::repeat_n(symbol, self.state.print_width).collect();
        self.print(&rule, None).await
    }

    pub async fn justify(&mut self, side: Justify) {
        match side {
            Justify::Left => self.run_resilient(async |s| s.justify_left().await).await,
            Justify::Center => self.run_resilient(async |s| s.justify_center().await).await,
            Justify::Right => self.run_resilient(async |s| s.justify_right().await).await,
        }
    }

    /// Character magnification steps, 0 = normal size
    pub async fn set_text_size(&mut self, width: u8, height: u8) {
        self.run_resilient(async |s| s.set_text_size(width, height).await)
            .await
    }

    /// Switch upside-down mode and remember it for future sessions
    pub async fn set_upside_down(&mut self, upside_down: bool) {
        let seq = if upside_down {
            UPSIDE_DOWN_ON
        } else {
            UPSIDE_DOWN_OFF
        };
        self.run_resilient(async |s| s.raw_write(seq).await).await;
        self.state.upside_down = upside_down;
    }

    /// Switch print smoothing; a reconnect resets it to the device default
    pub async fn set_smooth(&mut self, smooth: bool) {
        let seq = if smooth { SMOOTHING_ON } else { SMOOTHING_OFF };
        self.run_resilient(async |s| s.raw_write(seq).await).await
    }

    /// Cut with the default feed
    pub async fn cut_default(&mut self) {
        self.cut(DEFAULT_CUT_FEED).await
    }
}
