// crates/core/src/progress.rs
//! Transfer progress metering and console rendering

use crate::decorator::{Decorated, Direction, StreamHook};
use crate::stream::Stream;
use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Minimum time between two rendered progress lines
pub const EMIT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts transferred bytes and renders a progress line at most once per
/// [`EMIT_INTERVAL`].
///
/// The line is redrawn in place with a carriage return. When the meter is
/// finished after having drawn at least one line, a single newline is written
/// so the next output starts on a fresh line.
pub struct ProgressMeter {
    start: Instant,
    last_emit: Instant,
    total: u64,
    transferred: u64,
    closed: bool,
    printed: bool,
    console: Box<dyn Write + Send>,
}

impl ProgressMeter {
    /// Creates a meter rendering to stdout. A `total` of 0 means unknown and
    /// hides the percentage.
    pub fn new(total: u64) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_emit: now,
            total,
            transferred: 0,
            closed: false,
            printed: false,
            console: Box::new(io::stdout()),
        }
    }

    /// Renders to `console` instead of stdout
    pub fn with_console(mut self, console: impl Write + Send + 'static) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Bytes counted since creation or the last reset
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Expected total, 0 when unknown
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns true once at least one progress line was drawn
    pub fn has_printed(&self) -> bool {
        self.printed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Counts `bytes` and redraws the line if the interval has passed
    pub fn record(&mut self, bytes: usize) {
        self.record_at(bytes, Instant::now());
    }

    pub(crate) fn record_at(&mut self, bytes: usize, now: Instant) {
        self.transferred += bytes as u64;

        if now.saturating_duration_since(self.last_emit) < EMIT_INTERVAL {
            return;
        }

        if let Some(line) = self.render(now) {
            // A broken console never fails the transfer.
            match self.console.write_all(line.as_bytes()) {
                Ok(()) => self.printed = true,
                Err(e) => log::trace!("progress line dropped: {}", e),
            }
            self.console.flush().ok();
        }
        self.last_emit = now;
    }

    /// Builds the progress line, or `None` when the rate cannot be computed.
    fn render(&self, now: Instant) -> Option<String> {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        let rate = self.transferred as f64 / elapsed;
        if !rate.is_finite() {
            return None;
        }

        let percent = if self.total > 0 {
            format!("{}%", self.transferred.saturating_mul(100) / self.total)
        } else {
            String::new()
        };

        Some(format!(
            "\rProgress: {}b {}b/s {}       ",
            self.transferred,
            rate.floor() as u64,
            percent
        ))
    }

    /// Forgets everything counted so far
    pub fn reset(&mut self) {
        self.transferred = 0;
    }

    /// Ends the current line if one was drawn. Only the first call has an effect.
    pub fn finish(&mut self) {
        if self.printed && !self.closed {
            self.console.write_all(b"\n").ok();
            self.console.flush().ok();
        }
        self.closed = true;
    }
}

impl fmt::Debug for ProgressMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressMeter")
            .field("total", &self.total)
            .field("transferred", &self.transferred)
            .field("printed", &self.printed)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl StreamHook for ProgressMeter {
    fn after_transfer(&mut self, _direction: Direction, bytes: usize) {
        self.record(bytes);
    }

    fn on_rewind(&mut self) {
        self.reset();
    }

    fn on_close(&mut self) {
        self.finish();
    }
}

/// A stream that reports how many bytes went through it
pub type ProgressStream<S> = Decorated<S, ProgressMeter>;

impl<S: Stream> Decorated<S, ProgressMeter> {
    /// Wraps `inner`, rendering to stdout. `total_size_hint` of 0 hides the
    /// percentage.
    pub fn new(inner: S, total_size_hint: u64) -> Self {
        Self::with_hook(inner, ProgressMeter::new(total_size_hint))
    }

    /// Renders to `console` instead of stdout
    pub fn with_console(self, console: impl Write + Send + 'static) -> Self {
        self.map_hook(|meter| meter.with_console(console))
    }

    /// Bytes moved since creation or the last rewind
    pub fn transferred(&self) -> u64 {
        self.hook().transferred()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Console(Arc<Mutex<Vec<u8>>>);

    impl Console {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Console {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_no_line_within_first_second() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        let start = meter.start;

        for i in 0..100 {
            meter.record_at(10, start + Duration::from_millis(i * 5));
        }

        assert_eq!(meter.transferred(), 1000);
        assert!(!meter.has_printed());
        assert!(console.text().is_empty());
    }

    #[test]
    fn test_line_format_with_total() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(4000).with_console(console.clone());
        let start = meter.start;

        meter.record_at(1000, start + Duration::from_secs(2));

        assert!(meter.has_printed());
        assert_eq!(console.text(), "\rProgress: 1000b 500b/s 25%       ");
    }

    #[test]
    fn test_line_format_without_total() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        let start = meter.start;

        meter.record_at(300, start + Duration::from_secs(1));

        assert_eq!(console.text(), "\rProgress: 300b 300b/s        ");
    }

    #[test]
    fn test_at_most_one_line_per_interval() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        let start = meter.start;

        // 3.5 seconds of tiny transfers every 10ms
        for i in 1..=350 {
            meter.record_at(1, start + Duration::from_millis(i * 10));
        }

        let lines = console.text().matches('\r').count();
        assert_eq!(lines, 3);
    }

    #[test]
    fn test_zero_elapsed_skips_render() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        // The interval has passed since the last line, but not since start.
        let base = meter.start;
        meter.start = base + Duration::from_secs(2);

        meter.record_at(5, base + Duration::from_secs(2));

        assert!(!meter.has_printed());
        assert!(console.text().is_empty());
    }

    #[test]
    fn test_finish_without_lines_is_silent() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        meter.record(10);
        meter.finish();

        assert!(meter.is_closed());
        assert!(console.text().is_empty());
    }

    #[test]
    fn test_finish_emits_single_newline() {
        let console = Console::default();
        let mut meter = ProgressMeter::new(0).with_console(console.clone());
        let start = meter.start;
        meter.record_at(10, start + Duration::from_secs(1));

        meter.finish();
        meter.finish();

        assert_eq!(console.text().matches('\n').count(), 1);
        assert!(console.text().ends_with('\n'));
    }

    #[test]
    fn test_reset_clears_count() {
        let mut meter = ProgressMeter::new(0).with_console(io::sink());
        meter.record(42);
        meter.reset();
        assert_eq!(meter.transferred(), 0);
        meter.record(8);
        assert_eq!(meter.transferred(), 8);
    }
}
