//! Receipt layout buffer
//!
//! [`CommandQueue`] records a receipt as [`Command`]s and prints it in one
//! go on [`flush`](CommandQueue::flush). With the printer mounted upside
//! down the whole buffer is replayed in reverse, so the receipt reads top to
//! bottom once torn off.
//!
//! Reversal reorders lines only. The characters inside a line are left
//! alone; the printer's own upside-down mode rotates each line.

use std::fmt::Display;

use tracing::{debug, instrument};

use crate::chart::ChartRenderer;
use crate::command::{Command, DEFAULT_CUT_FEED, Justify};
use crate::connection::ConnectionManager;
use crate::device::PrinterDevice;
use crate::error::{PrintError, PrintResult};
use crate::table::TableRenderer;

/// Deferred command buffer in front of a [`ConnectionManager`]
///
/// The orientation is fixed when the queue is built: both the size brackets
/// queued by [`text`](Self::text) and the flush order depend on it.
pub struct CommandQueue<D: PrinterDevice> {
    printer: ConnectionManager<D>,
    buffer: Vec<Command>,
    upside_down: bool,
}

impl<D: PrinterDevice> CommandQueue<D> {
    /// Wrap `printer`, writing its current orientation to the device
    pub async fn new(printer: ConnectionManager<D>) -> Self {
        let upside_down = printer.state().upside_down;
        Self::with_orientation(printer, upside_down).await
    }

    /// Wrap `printer` and switch it to the given orientation
    pub async fn with_orientation(mut printer: ConnectionManager<D>, upside_down: bool) -> Self {
        printer.set_upside_down(upside_down).await;
        Self {
            printer,
            buffer: Vec::new(),
            upside_down,
        }
    }

    /// Orientation the buffer is laid out for
    pub fn upside_down(&self) -> bool {
        self.upside_down
    }

    /// Characters per line
    pub fn width(&self) -> usize {
        self.printer.state().print_width
    }

    pub fn printer(&self) -> &ConnectionManager<D> {
        &self.printer
    }

    /// Direct access to the printer; bypasses the buffer
    ///
    /// Changing the orientation here does not change how this queue lays
    /// out or replays its commands.
    pub fn printer_mut(&mut self) -> &mut ConnectionManager<D> {
        &mut self.printer
    }

    pub fn into_printer(self) -> ConnectionManager<D> {
        self.printer
    }

    /// Pending commands in insertion order
    pub fn commands(&self) -> &[Command] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Pending commands as a JSON array
    pub fn to_json(&self) -> PrintResult<String> {
        serde_json::to_string(&self.buffer).map_err(|e| PrintError::InvalidArgument(e.to_string()))
    }

    pub fn push(&mut self, command: Command) -> &mut Self {
        self.buffer.push(command);
        self
    }

    // === Layout ===

    /// Add a line of text
    ///
    /// A non-zero `size` wraps the line in magnify/reset commands. Upside
    /// down they are queued in the opposite order so that, after the flush
    /// reversal, the size is still applied before the text and reset after.
    pub fn text(
        &mut self,
        text: impl Into<String>,
        justify: Option<Justify>,
        size: Option<u8>,
    ) -> &mut Self {
        let size = size.filter(|&s| s != 0);
        let (before, after) = match size {
            Some(s) if self.upside_down() => ((0, 0), (s, s)),
            Some(s) => ((s, s), (0, 0)),
            None => ((0, 0), (0, 0)),
        };

        if size.is_some() {
            self.set_text_size(before.0, before.1);
        }
        self.push(Command::Text {
            text: text.into(),
            justify,
        });
        if size.is_some() {
            self.set_text_size(after.0, after.1);
        }
        self
    }

    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.push(Command::Feed { lines })
    }

    /// Full-width horizontal rule
    pub fn line(&mut self) -> &mut Self {
        self.push(Command::Line)
    }

    pub fn justify(&mut self, side: Justify) -> &mut Self {
        self.push(Command::Justify { side })
    }

    pub fn cut(&mut self) -> &mut Self {
        self.push(Command::Cut {
            feed: DEFAULT_CUT_FEED,
        })
    }

    pub fn set_text_size(&mut self, width: u8, height: u8) -> &mut Self {
        self.push(Command::SetTextSize { width, height })
    }

    /// Add a framed ASCII chart of `series`, `height` rows tall
    pub fn print_chart(&mut self, series: &[f64], height: usize) -> PrintResult<&mut Self> {
        let lines = ChartRenderer::new(self.width(), height)?.render(series)?;
        for line in lines {
            self.text(line, None, None);
        }
        Ok(self)
    }

    /// Add one right-aligned `key: value` line per row
    pub fn print_table<K: Display, V: Display>(
        &mut self,
        rows: &[(K, V)],
        padding: usize,
    ) -> &mut Self {
        let lines = TableRenderer::new(self.width(), padding).render(rows);
        for line in lines {
            self.text(line, None, None);
        }
        self
    }

    // === Output ===

    /// Print everything buffered, then clear the buffer
    #[instrument(skip(self), fields(commands = self.buffer.len(), upside_down = self.upside_down()))]
    pub async fn flush(&mut self) {
        if self.upside_down() {
            self.buffer.reverse();
        }

        for command in &self.buffer {
            debug!(?command, "replaying");
            command.apply(&mut self.printer).await;
        }

        self.buffer.clear();
    }

    /// Flush, then cut
    pub async fn print_and_cut(&mut self) {
        self.flush().await;
        self.printer.cut_default().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PrinterConfig, RetryPolicy};
    use crate::device::mock::{Call, MockDevice};
    use crate::escpos::UPSIDE_DOWN_ON;

    async fn queue(device: &MockDevice, upside_down: bool) -> CommandQueue<MockDevice> {
        let config = PrinterConfig {
            retry: RetryPolicy::immediate(),
            ..Default::default()
        };
        let printer = ConnectionManager::connected(device.clone(), &config).await;
        let q = CommandQueue::with_orientation(printer, upside_down).await;
        device.clear_calls();
        q
    }

    #[tokio::test]
    async fn test_append_does_not_touch_device() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.text("a", None, None).feed(1).line().cut();

        assert_eq!(q.len(), 4);
        assert!(device.calls().is_empty());
    }

    #[tokio::test]
    async fn test_flush_in_insertion_order() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.text("one", None, None)
            .text("two", None, None)
            .feed(3)
            .text("three", None, None);
        q.flush().await;

        assert_eq!(
            device.calls(),
            vec![
                Call::Text("one".into()),
                Call::Text("two".into()),
                Call::Lf(3),
                Call::Text("three".into()),
            ]
        );
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn test_flush_reversed_when_upside_down() {
        let device = MockDevice::new();
        let mut q = queue(&device, true).await;

        q.text("one", None, None)
            .text("two", None, None)
            .feed(3)
            .text("three", None, None);
        q.flush().await;

        assert_eq!(
            device.calls(),
            vec![
                Call::Text("three".into()),
                Call::Lf(3),
                Call::Text("two".into()),
                Call::Text("one".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_sized_text_brackets() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.text("BIG", None, Some(2));
        assert_eq!(
            q.commands(),
            &[
                Command::SetTextSize {
                    width: 2,
                    height: 2
                },
                Command::Text {
                    text: "BIG".into(),
                    justify: None
                },
                Command::SetTextSize {
                    width: 0,
                    height: 0
                },
            ]
        );

        q.text("small", None, Some(0));
        assert_eq!(q.len(), 4);
    }

    #[tokio::test]
    async fn test_sized_text_upside_down_prints_in_order() {
        let device = MockDevice::new();
        let mut q = queue(&device, true).await;

        q.text("BIG", Some(Justify::Center), Some(3));
        q.flush().await;

        assert_eq!(
            device.calls(),
            vec![
                Call::SetTextSize(3, 3),
                Call::JustifyCenter,
                Call::Text("BIG".into()),
                Call::JustifyLeft,
                Call::SetTextSize(0, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_orientation_fixed_at_construction() {
        let device = MockDevice::new();
        let mut q = queue(&device, true).await;

        q.text("BIG", None, Some(2));
        q.printer_mut().set_upside_down(false).await;
        device.clear_calls();
        q.flush().await;

        assert!(q.upside_down());
        assert_eq!(
            device.calls(),
            vec![
                Call::SetTextSize(2, 2),
                Call::Text("BIG".into()),
                Call::SetTextSize(0, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_print_and_cut() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.line();
        q.print_and_cut().await;

        assert_eq!(
            device.calls(),
            vec![Call::Text("#".repeat(48)), Call::Cut(2)]
        );
    }

    #[tokio::test]
    async fn test_flush_survives_disconnect() {
        let device = MockDevice::new();
        let mut q = queue(&device, true).await;

        q.text("first", None, None).text("second", None, None);
        device.fail_ops(1);
        q.flush().await;

        // orientation is back on the new session before the replay resumes
        assert_eq!(
            device.calls(),
            vec![
                Call::Open(2),
                Call::Init,
                Call::Raw(UPSIDE_DOWN_ON.to_vec()),
                Call::Text("second".into()),
                Call::Text("first".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_chart_and_table_lines() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.print_table(&[("A", 1)], 0);
        q.print_chart(&[1.0, 2.0, 3.0], 4).unwrap();
        assert!(q.print_chart(&[1.0], 4).is_err());
        q.flush().await;

        let texts = device.texts();
        // table row + top border + rows 4,3,2,0 + bottom border
        assert_eq!(texts.len(), 7);
        assert!(texts.iter().all(|t| t.chars().count() == 48));
        assert_eq!(texts[1], format!("+{}+", "-".repeat(46)));
    }

    #[tokio::test]
    async fn test_to_json() {
        let device = MockDevice::new();
        let mut q = queue(&device, false).await;

        q.justify(Justify::Right).feed(2);
        assert_eq!(
            q.to_json().unwrap(),
            r#"[{"op":"justify","side":"right"},{"op":"feed","lines":2}]"#
        );
    }
}
