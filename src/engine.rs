use std::mem;
use std::time::{Duration, SystemTime};

use rand::{rngs::StdRng, SeedableRng};

use crate::clock::{elapsed_between, Clock};
use crate::feedback::{Feedback, Signal};
use crate::phrases::PhrasePool;
use crate::scoring::{self, Score};
use crate::session::{Outcome, Session};
use crate::timer::{Deadline, RepeatingTimer};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub tick_period: Duration,
    pub restart_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

/// Final numbers of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_id: u64,
    pub phrase: String,
    pub score: Score,
    pub errors: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started { session_id: u64, phrase: String },
    Judged { index: usize, outcome: Outcome },
    Tick { elapsed_secs: u64 },
    Completed(SessionReport),
}

/// Mirror of the text input the user types into.
#[derive(Debug, Clone, Default)]
pub struct InputSurface {
    value: String,
    enabled: bool,
}

impl InputSurface {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Owns the live session and drives it through keystrokes, ticks, completion
/// and the delayed restart.
pub struct Engine<C: Clock> {
    pool: PhrasePool,
    clock: C,
    rng: StdRng,
    feedback: Box<dyn Feedback>,
    timing: Timing,
    session: Session,
    next_id: u64,
    input: InputSurface,
    timer: RepeatingTimer,
    restart: Deadline,
    score: Score,
    elapsed_secs: u64,
    last_signal: Option<(Signal, SystemTime)>,
    events: Vec<EngineEvent>,
}

impl<C: Clock> Engine<C> {
    pub fn new(pool: PhrasePool, clock: C, feedback: Box<dyn Feedback>, timing: Timing) -> Self {
        Self::with_rng(pool, clock, feedback, timing, StdRng::from_entropy())
    }

    /// Builds the engine and starts its first session.
    pub fn with_rng(
        pool: PhrasePool,
        clock: C,
        feedback: Box<dyn Feedback>,
        timing: Timing,
        rng: StdRng,
    ) -> Self {
        let now = clock.now();
        let mut engine = Self {
            session: Session::new(0, pool.phrases()[0].clone(), now),
            pool,
            clock,
            rng,
            feedback,
            timer: RepeatingTimer::new(timing.tick_period),
            timing,
            next_id: 0,
            input: InputSurface::default(),
            restart: Deadline::default(),
            score: Score::default(),
            elapsed_secs: 0,
            last_signal: None,
            events: Vec::new(),
        };
        engine.start();
        engine
    }

    /// Begins a fresh session on a random phrase. Replaces the tick timer and
    /// drops any restart still pending for the previous session.
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.next_id += 1;
        let phrase = self.pool.choose(&mut self.rng).to_string();
        self.session = Session::new(self.next_id, phrase, now);

        self.input.value.clear();
        self.input.enabled = true;

        self.restart.cancel();
        self.timer.cancel();
        self.timer.start(now);

        self.elapsed_secs = 0;
        self.refresh_score(now);

        log::debug!(
            "session {} started: {:?}",
            self.session.id(),
            self.session.target_text()
        );
        self.events.push(EngineEvent::Started {
            session_id: self.session.id(),
            phrase: self.session.target_text().to_string(),
        });
    }

    /// Explicit restart action; skips whatever the completion flow scheduled.
    pub fn restart(&mut self) {
        log::debug!("manual restart of session {}", self.session.id());
        self.start();
    }

    /// Judges one character against the next target position. Does nothing
    /// once the session is complete.
    pub fn consume_keystroke(&mut self, typed: char) -> Option<Outcome> {
        self.judge_next(Some(typed))
    }

    fn judge_next(&mut self, typed: Option<char>) -> Option<Outcome> {
        let index = self.session.typed_index();
        let outcome = self.session.judge_slot(typed)?;
        let now = self.clock.now();

        let signal = match outcome {
            Outcome::Correct => Signal::Success,
            Outcome::Incorrect => Signal::Error,
        };
        self.feedback.signal(signal);
        self.last_signal = Some((signal, now));
        self.events.push(EngineEvent::Judged { index, outcome });

        if self.session.completed() {
            self.complete(now);
        }
        Some(outcome)
    }

    fn complete(&mut self, now: SystemTime) {
        self.timer.cancel();
        self.refresh_score(now);
        self.input.enabled = false;
        match now.checked_add(self.timing.restart_delay) {
            Some(at) => self.restart.schedule(at, self.session.id()),
            None => log::warn!(
                "restart delay {:?} out of range; waiting for a manual restart",
                self.timing.restart_delay
            ),
        }

        let report = SessionReport {
            session_id: self.session.id(),
            phrase: self.session.target_text().to_string(),
            score: self.score,
            errors: self.session.error_count(),
            elapsed: elapsed_between(self.session.started_at(), now),
        };
        log::info!(
            "session {} complete: {} ({} errors)",
            report.session_id,
            report.score,
            report.errors
        );
        self.events.push(EngineEvent::Completed(report));
    }

    /// One timer period elapsed: republish elapsed time and the score.
    pub fn tick(&mut self) {
        if self.session.completed() {
            return;
        }
        let now = self.clock.now();
        self.elapsed_secs = scoring::elapsed_secs(self.session.started_at(), now);
        self.refresh_score(now);
        self.events.push(EngineEvent::Tick {
            elapsed_secs: self.elapsed_secs,
        });
    }

    /// Fires whatever is due: the tick timer and the delayed restart.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        if self.timer.fire(now) {
            self.tick();
        }
        match self.restart.take_due(now) {
            Some(id) if id == self.session.id() => self.start(),
            Some(id) => log::debug!("ignoring stale restart for session {id}"),
            None => {}
        }
    }

    /// Appends a typed character to the input field.
    pub fn on_key(&mut self, c: char) {
        if !self.input.enabled {
            return;
        }
        self.input.value.push(c);
        self.on_input_changed();
    }

    pub fn on_backspace(&mut self) {
        if !self.input.enabled {
            return;
        }
        self.input.value.pop();
        self.on_input_changed();
    }

    /// Every change judges whatever sits in the field at the next unjudged
    /// position. After a deletion that slot is empty and counts as a miss.
    fn on_input_changed(&mut self) {
        let typed = self.input.value.chars().nth(self.session.typed_index());
        self.judge_next(typed);
        self.refresh_score(self.clock.now());
    }

    fn refresh_score(&mut self, now: SystemTime) {
        self.score = Score::compute(&self.session, &self.input.value, now);
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        mem::take(&mut self.events)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn pool(&self) -> &PhrasePool {
        &self.pool
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn last_signal(&self) -> Option<(Signal, SystemTime)> {
        self.last_signal
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// When the automatic restart will fire, if one is pending.
    pub fn restart_due(&self) -> Option<SystemTime> {
        self.restart.due_at()
    }
}
