use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

/// Interval between two countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Countdown tick tagged with the generation of the timer that sent it
    Tick(u64),
    /// Nothing arrived within the poll interval
    Idle,
}

/// Source of application events (keyboard, resize, timer ticks)
pub trait AppEventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Channel-backed event source. Producers (the terminal reader thread and
/// interval tickers) post into clones of its sender.
pub struct ChannelEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Event source fed by a background thread reading crossterm events
    pub fn with_terminal_input() -> Self {
        let source = Self::new();
        let tx = source.sender();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!(%err, "terminal input reader stopped");
                    break;
                }
            };

            if forwarded.is_err() {
                break;
            }
        });

        source
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for ChannelEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AppEvent::Idle
            }
        }
    }
}

/// Wall clock in epoch milliseconds
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock; clones share the same instant
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn starting_at(millis: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(millis)),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.set(millis);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by.as_millis() as i64);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

/// Handle to an armed tick source. Dropping it cancels the timer.
pub trait TickGuard {
    fn generation(&self) -> u64;
}

/// Something that can start a repeating one-second tick on demand
pub trait TickSource {
    type Guard: TickGuard;

    fn arm(&self) -> Self::Guard;
}

/// Spawns a thread per armed period that posts `AppEvent::Tick` into the
/// event channel until its guard is dropped.
pub struct IntervalTicker {
    tx: Sender<AppEvent>,
    interval: Duration,
    generations: AtomicU64,
}

impl IntervalTicker {
    pub fn new(tx: Sender<AppEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            generations: AtomicU64::new(0),
        }
    }
}

impl TickSource for IntervalTicker {
    type Guard = IntervalGuard;

    fn arm(&self) -> IntervalGuard {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let stopped = Arc::new(AtomicBool::new(false));

        let tx = self.tx.clone();
        let interval = self.interval;
        let stop_flag = Arc::clone(&stopped);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if stop_flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(AppEvent::Tick(generation)).is_err() {
                break;
            }
        });

        debug!(generation, "tick armed");
        IntervalGuard {
            generation,
            stopped,
        }
    }
}

#[derive(Debug)]
pub struct IntervalGuard {
    generation: u64,
    stopped: Arc<AtomicBool>,
}

impl TickGuard for IntervalGuard {
    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for IntervalGuard {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        debug!(generation = self.generation, "tick cancelled");
    }
}

/// Tick source for tests: nothing fires on its own, the test calls
/// `tick()` directly. Tracks how many guards are alive.
#[derive(Clone, Debug, Default)]
pub struct ManualTickSource {
    armed: Rc<Cell<usize>>,
    generations: Rc<Cell<u64>>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guards currently alive
    pub fn armed(&self) -> usize {
        self.armed.get()
    }

    /// Generation of the most recently armed guard
    pub fn last_generation(&self) -> u64 {
        self.generations.get()
    }
}

impl TickSource for ManualTickSource {
    type Guard = ManualTickGuard;

    fn arm(&self) -> ManualTickGuard {
        let generation = self.generations.get() + 1;
        self.generations.set(generation);
        self.armed.set(self.armed.get() + 1);

        ManualTickGuard {
            generation,
            armed: Rc::clone(&self.armed),
        }
    }
}

#[derive(Debug)]
pub struct ManualTickGuard {
    generation: u64,
    armed: Rc<Cell<usize>>,
}

impl TickGuard for ManualTickGuard {
    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ManualTickGuard {
    fn drop(&mut self) {
        self.armed.set(self.armed.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn step_returns_idle_on_timeout() {
        let source = ChannelEventSource::new();
        let runner = Runner::new(source, Duration::from_millis(1));

        assert_matches!(runner.step(), AppEvent::Idle);
    }

    #[test]
    fn step_passes_through_events() {
        let source = ChannelEventSource::new();
        source.sender().send(AppEvent::Resize).unwrap();
        let runner = Runner::new(source, Duration::from_millis(10));

        assert_matches!(runner.step(), AppEvent::Resize);
    }

    #[test]
    fn interval_ticker_posts_tagged_ticks() {
        let source = ChannelEventSource::new();
        let ticker = IntervalTicker::new(source.sender(), Duration::from_millis(5));

        let guard = ticker.arm();
        let event = source.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_matches!(event, AppEvent::Tick(g) if g == guard.generation());
    }

    #[test]
    fn interval_ticker_stops_after_guard_dropped() {
        let source = ChannelEventSource::new();
        let ticker = IntervalTicker::new(source.sender(), Duration::from_millis(5));

        let guard = ticker.arm();
        source.recv_timeout(Duration::from_secs(1)).unwrap();
        drop(guard);

        // drain anything already in flight, then make sure nothing else shows up
        thread::sleep(Duration::from_millis(30));
        while source.recv_timeout(Duration::from_millis(1)).is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(source.recv_timeout(Duration::from_millis(1)).is_err());
    }

    #[test]
    fn interval_ticker_generations_increase() {
        let source = ChannelEventSource::new();
        let ticker = IntervalTicker::new(source.sender(), Duration::from_secs(60));

        let first = ticker.arm();
        let second = ticker.arm();
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn manual_tick_source_counts_live_guards() {
        let ticks = ManualTickSource::new();
        assert_eq!(ticks.armed(), 0);

        let guard = ticks.arm();
        assert_eq!(ticks.armed(), 1);
        assert_eq!(guard.generation(), ticks.last_generation());

        drop(guard);
        assert_eq!(ticks.armed(), 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::starting_at(1_000);
        let shared = clock.clone();

        shared.advance(Duration::from_secs(2));
        assert_eq!(clock.now_millis(), 3_000);

        clock.set(10);
        assert_eq!(shared.now_millis(), 10);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
