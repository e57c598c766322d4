use tracing::{debug, info};

use crate::metrics::{classify_characters, compute_metrics, CharClass, Metrics};
use crate::runtime::{Clock, SystemClock, TickGuard, TickSource};

/// Length of one test run
pub const TEST_DURATION_SECS: u32 = 60;

/// Text every run asks the user to reproduce
pub const SAMPLE_TEXT: &str = "Kerala's most audacious make-a-thon! This 18-hour overnight event challenges TinkerHub Campus Chapter students to create brilliantly impractical tech solutions. Participants can build anything using software, hardware, or both - as long as it's purposefully useless! It's a playground for unbridled creativity, skill development, and the chance to win exciting prizes, including a 6-month scholarship.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum TestState {
    Welcome,
    Active,
    Paused,
    Finished,
}

/// Mutable state of the current run
#[derive(Clone, Debug, PartialEq)]
pub struct TestSession {
    pub state: TestState,
    pub reference_text: String,
    pub typed_text: String,
    pub started_at_epoch_millis: Option<i64>,
    pub remaining_seconds: u32,
    pub metrics: Metrics,
}

impl TestSession {
    pub fn new(reference_text: String) -> Self {
        Self {
            state: TestState::Welcome,
            reference_text,
            typed_text: String::new(),
            started_at_epoch_millis: None,
            remaining_seconds: TEST_DURATION_SECS,
            metrics: Metrics::default(),
        }
    }

    fn clear(&mut self) {
        self.typed_text.clear();
        self.started_at_epoch_millis = None;
        self.remaining_seconds = TEST_DURATION_SECS;
        self.metrics = Metrics::default();
    }
}

/// Read-only view handed to the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState<'a> {
    pub state: TestState,
    pub remaining_seconds: u32,
    pub words_per_minute: u32,
    pub accuracy_percent: u32,
    pub reference_text: &'a str,
    pub typed_text: &'a str,
    pub classification: Vec<CharClass>,
}

/// Lifecycle state machine for a timed typing test.
///
/// Calls that are not valid in the current state are ignored and leave the
/// session untouched; every operation reports whether it was applied.
///
/// The engine owns the tick guard while the test is Active. The guard is
/// dropped (cancelling the timer) on pause, on finish, and when the engine
/// itself is dropped.
pub struct TypingTestEngine<
    T: TickSource = crate::runtime::IntervalTicker,
    C: Clock = SystemClock,
> {
    session: TestSession,
    ticker: T,
    clock: C,
    tick_guard: Option<T::Guard>,
}

impl<T: TickSource, C: Clock> TypingTestEngine<T, C> {
    pub fn new(reference_text: impl Into<String>, ticker: T, clock: C) -> Self {
        Self {
            session: TestSession::new(reference_text.into()),
            ticker,
            clock,
            tick_guard: None,
        }
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    pub fn state(&self) -> TestState {
        self.session.state
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.session.remaining_seconds
    }

    pub fn typed_text(&self) -> &str {
        &self.session.typed_text
    }

    pub fn metrics(&self) -> Metrics {
        self.session.metrics
    }

    /// Generation of the armed tick, if the test is running
    pub fn tick_generation(&self) -> Option<u64> {
        self.tick_guard.as_ref().map(TickGuard::generation)
    }

    /// Begin a fresh run from Welcome, or retry from Finished
    pub fn start(&mut self) -> bool {
        if !matches!(self.session.state, TestState::Welcome | TestState::Finished) {
            return self.ignored("start");
        }

        self.session.clear();
        self.session.started_at_epoch_millis = Some(self.clock.now_millis());
        self.session.state = TestState::Active;
        self.tick_guard = Some(self.ticker.arm());

        info!(
            started_at = ?self.session.started_at_epoch_millis,
            "typing test started"
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.session.state != TestState::Active {
            return self.ignored("pause");
        }

        self.tick_guard = None;
        self.session.state = TestState::Paused;

        info!(
            remaining = self.session.remaining_seconds,
            "typing test paused"
        );
        true
    }

    /// Continue a paused run; the original start timestamp is kept
    pub fn resume(&mut self) -> bool {
        if self.session.state != TestState::Paused {
            return self.ignored("resume");
        }

        self.session.state = TestState::Active;
        self.tick_guard = Some(self.ticker.arm());

        info!(
            remaining = self.session.remaining_seconds,
            "typing test resumed"
        );
        true
    }

    pub fn reset(&mut self) -> bool {
        if !matches!(self.session.state, TestState::Paused | TestState::Finished) {
            return self.ignored("reset");
        }

        self.tick_guard = None;
        self.session.clear();
        self.session.state = TestState::Welcome;

        info!("typing test reset");
        true
    }

    /// Replace the typed text with the full current content of the input.
    ///
    /// Ignored unless Active, and ignored when the new text is longer than
    /// the reference (the previous text is kept).
    pub fn submit_input(&mut self, new_text: &str) -> bool {
        if self.session.state != TestState::Active {
            return self.ignored("submit_input");
        }

        let reference_len = self.session.reference_text.chars().count();
        if new_text.chars().count() > reference_len {
            debug!(reference_len, "input longer than reference rejected");
            return false;
        }

        self.session.typed_text.clear();
        self.session.typed_text.push_str(new_text);
        self.recompute();
        true
    }

    /// One second of the countdown; finishes the run at zero
    pub fn tick(&mut self) -> bool {
        if self.session.state != TestState::Active {
            return self.ignored("tick");
        }

        if self.session.remaining_seconds <= 1 {
            self.session.remaining_seconds = 0;
            self.session.state = TestState::Finished;
            self.tick_guard = None;
            self.recompute();

            info!(
                wpm = self.session.metrics.words_per_minute,
                accuracy = self.session.metrics.accuracy_percent,
                "typing test finished"
            );
        } else {
            self.session.remaining_seconds -= 1;
            self.recompute();
        }
        true
    }

    /// Snapshot for rendering; classification is rebuilt on every call
    pub fn render_state(&self) -> RenderState<'_> {
        let session = &self.session;
        RenderState {
            state: session.state,
            remaining_seconds: session.remaining_seconds,
            words_per_minute: session.metrics.words_per_minute,
            accuracy_percent: session.metrics.accuracy_percent,
            reference_text: &session.reference_text,
            typed_text: &session.typed_text,
            classification: classify_characters(&session.reference_text, &session.typed_text),
        }
    }

    fn recompute(&mut self) {
        self.session.metrics = compute_metrics(
            &self.session.reference_text,
            &self.session.typed_text,
            self.session.started_at_epoch_millis,
            self.clock.now_millis(),
        );
    }

    fn ignored(&self, operation: &'static str) -> bool {
        debug!(operation, state = %self.session.state, "ignored in current state");
        false
    }
}
