// crates/core/src/throttle.rs
//! Bandwidth throttling for streams
//!
//! The limiter counts the bytes moved in the current window and, when the
//! window ran ahead of the target rate, sleeps long enough to fall back in
//! line. Sleeps shorter than [`MIN_SLEEP`] are deferred so tiny deltas do not
//! cause oversleeping; the owed time keeps accumulating and is paid later.
//! Whatever the scheduler adds to or removes from a sleep is carried into the
//! next one as an adjustment.

use crate::decorator::{Decorated, Direction, StreamHook};
use crate::progress::ProgressMeter;
use crate::stream::Stream;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

/// Smallest chunk cap, also used when the rate is unlimited
pub const MIN_CHUNK: usize = 512;

/// Chunk cap in bytes per byte/s of target rate
pub const CHUNK_FACTOR: u64 = 128;

/// Sleeps shorter than this are deferred
pub const MIN_SLEEP: Duration = Duration::from_millis(200);

/// Bound on the carried sleep adjustment, in either direction
pub const MAX_ADJUST: Duration = Duration::from_millis(500);

/// What the limiter wants done after a transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pace {
    /// No time is owed; the window was restarted
    OnSchedule,
    /// Time is owed but too little to sleep for; keep accumulating
    Deferred,
    /// Sleep this long, then call [`BandwidthLimiter::settle`]
    Sleep(Duration),
}

/// Self-correcting chunked-sleep rate limiter
#[derive(Debug, Clone)]
pub struct BandwidthLimiter {
    rate: u64,
    chunk_cap: usize,
    window_start: Instant,
    window_bytes: u64,
    // seconds, within +/- MAX_ADJUST
    sleep_adjust: f64,
}

impl BandwidthLimiter {
    /// Creates a limiter for `bytes_per_second`; 0 disables throttling
    pub fn new(bytes_per_second: u64) -> Self {
        let cap = bytes_per_second.saturating_mul(CHUNK_FACTOR);
        let chunk_cap = usize::try_from(cap).unwrap_or(usize::MAX).max(MIN_CHUNK);

        Self {
            rate: bytes_per_second,
            chunk_cap,
            window_start: Instant::now(),
            window_bytes: 0,
            sleep_adjust: 0.0,
        }
    }

    /// Target rate in bytes per second, 0 when unlimited
    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn is_unlimited(&self) -> bool {
        self.rate == 0
    }

    /// Largest transfer allowed in a single call
    pub fn chunk_cap(&self) -> usize {
        self.chunk_cap
    }

    /// Bytes counted in the current window
    pub fn window_bytes(&self) -> u64 {
        self.window_bytes
    }

    /// Correction applied to the next sleep, in seconds
    pub fn sleep_adjustment(&self) -> f64 {
        self.sleep_adjust
    }

    /// Counts `bytes` and sleeps if the window ran ahead of the target rate
    pub fn throttle(&mut self, bytes: usize) {
        if self.is_unlimited() {
            return;
        }

        if let Pace::Sleep(planned) = self.register(bytes, Instant::now()) {
            log::trace!("throttle sleeping {:?}", planned);
            let t0 = Instant::now();
            thread::sleep(planned);
            let t1 = Instant::now();
            self.settle(planned, t1 - t0, t1);
        }
    }

    /// Counts `bytes` moved at `now` and decides how to pace.
    ///
    /// On [`Pace::Sleep`] the window is left open; the caller sleeps and then
    /// reports the outcome through [`settle`](Self::settle).
    pub fn register(&mut self, bytes: usize, now: Instant) -> Pace {
        if self.is_unlimited() {
            return Pace::OnSchedule;
        }

        self.window_bytes += bytes as u64;

        let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
        let expected = self.window_bytes as f64 / self.rate as f64;

        if expected > elapsed {
            let to_sleep = expected - elapsed + self.sleep_adjust;
            if to_sleep < MIN_SLEEP.as_secs_f64() {
                return Pace::Deferred;
            }
            return Pace::Sleep(Duration::from_secs_f64(to_sleep));
        }

        self.restart_at(now);
        Pace::OnSchedule
    }

    /// Records how long a planned sleep really took and opens a new window
    pub fn settle(&mut self, planned: Duration, actual: Duration, now: Instant) {
        let limit = MAX_ADJUST.as_secs_f64();
        let drift = planned.as_secs_f64() - actual.as_secs_f64();
        self.sleep_adjust = drift.clamp(-limit, limit);
        self.restart_at(now);
    }

    /// Drops the current window
    pub fn restart(&mut self) {
        self.restart_at(Instant::now());
    }

    fn restart_at(&mut self, now: Instant) {
        self.window_start = now;
        self.window_bytes = 0;
    }
}

/// Hook combining a limiter with a progress meter
#[derive(Debug)]
pub struct Throttle {
    limiter: BandwidthLimiter,
    meter: ProgressMeter,
}

impl Throttle {
    pub fn new(bytes_per_second: u64, total: u64) -> Self {
        Self {
            limiter: BandwidthLimiter::new(bytes_per_second),
            meter: ProgressMeter::new(total),
        }
    }

    pub fn limiter(&self) -> &BandwidthLimiter {
        &self.limiter
    }

    pub fn meter(&self) -> &ProgressMeter {
        &self.meter
    }
}

impl StreamHook for Throttle {
    fn chunk_limit(&self) -> Option<usize> {
        Some(self.limiter.chunk_cap())
    }

    fn after_transfer(&mut self, _direction: Direction, bytes: usize) {
        self.meter.record(bytes);
        self.limiter.throttle(bytes);
    }

    fn on_rewind(&mut self) {
        self.meter.reset();
        self.limiter.restart();
    }

    fn on_close(&mut self) {
        self.meter.finish();
    }
}

/// A stream whose reads and writes are held to a target rate
pub type ThrottledStream<S> = Decorated<S, Throttle>;

impl<S: Stream> Decorated<S, Throttle> {
    /// Wraps `inner`, limiting it to `bytes_per_second` (0 = unlimited) and
    /// rendering progress to stdout. `total_size_hint` of 0 hides the
    /// percentage.
    pub fn new(inner: S, bytes_per_second: u64, total_size_hint: u64) -> Self {
        Self::with_hook(inner, Throttle::new(bytes_per_second, total_size_hint))
    }

    /// Renders progress to `console` instead of stdout
    pub fn with_console(self, console: impl Write + Send + 'static) -> Self {
        self.map_hook(|hook| Throttle {
            meter: hook.meter.with_console(console),
            ..hook
        })
    }

    /// Bytes moved since creation or the last rewind
    pub fn transferred(&self) -> u64 {
        self.hook().meter().transferred()
    }
}
