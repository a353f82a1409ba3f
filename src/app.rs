use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::clock::{elapsed_between, Clock};
use crate::engine::{Engine, EngineEvent, SessionReport};
use crate::feedback::Signal;
use crate::history::{HistoryLog, HistoryRecord};
use crate::message::MessageArea;
use crate::runtime::AppEvent;

/// How long the input border shows the colour of the last keystroke.
pub const FLASH: Duration = Duration::from_millis(150);

pub struct App<C: Clock> {
    pub engine: Engine<C>,
    pub message: MessageArea,
    history: Option<HistoryLog>,
    completed_sessions: usize,
    should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(engine: Engine<C>, message_timeout: Duration, history: Option<HistoryLog>) -> Self {
        let mut app = Self {
            engine,
            message: MessageArea::new(message_timeout),
            history,
            completed_sessions: 0,
            should_quit: false,
        };
        app.process_engine_events();
        app
    }

    pub fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick => {
                self.engine.poll();
                let now = self.engine.clock().now();
                self.message.expire(now);
            }
            AppEvent::Resize => {}
        }
        self.process_engine_events();
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.engine.restart(),
            KeyCode::Tab => self.engine.restart(),
            KeyCode::Backspace => self.engine.on_backspace(),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.engine.on_key(c)
            }
            _ => {}
        }
    }

    fn process_engine_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::Completed(report) => self.on_completed(&report),
                EngineEvent::Started { session_id, phrase } => {
                    log::info!("session {session_id}: {phrase}");
                }
                EngineEvent::Judged { .. } | EngineEvent::Tick { .. } => {}
            }
        }
    }

    fn on_completed(&mut self, report: &SessionReport) {
        self.completed_sessions += 1;
        let now = self.engine.clock().now();
        let summary = report.score.summary(self.engine.timing().restart_delay);
        self.message.show(summary, now);

        if let Some(history) = &self.history {
            let record = HistoryRecord::from_report(report, DateTime::<Local>::from(now));
            if let Err(e) = history.append(&record) {
                log::warn!("could not record session {}: {e:#}", report.session_id);
            }
        }
    }

    /// Signal to render on the input border, if it is still fresh.
    pub fn flash(&self) -> Option<Signal> {
        let (signal, at) = self.engine.last_signal()?;
        (elapsed_between(at, self.engine.clock().now()) < FLASH).then_some(signal)
    }

    /// Whole seconds left before the automatic restart, rounded up.
    pub fn restart_countdown(&self) -> Option<u64> {
        let due = self.engine.restart_due()?;
        let left = due
            .duration_since(self.engine.clock().now())
            .unwrap_or_default();
        Some(left.as_millis().div_ceil(1000) as u64)
    }

    pub fn now(&self) -> SystemTime {
        self.engine.clock().now()
    }

    pub fn completed_sessions(&self) -> usize {
        self.completed_sessions
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::engine::Timing;
    use crate::feedback::Silent;
    use crate::phrases::PhrasePool;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    fn app(phrase: &str, history: Option<HistoryLog>) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let engine = Engine::with_rng(
            PhrasePool::single(phrase).unwrap(),
            clock.clone(),
            Box::new(Silent),
            Timing::default(),
            StdRng::seed_from_u64(3),
        );
        (App::new(engine, Duration::from_secs(3), history), clock)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut App<ManualClock>, text: &str) {
        for c in text.chars() {
            app.handle(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let (mut a, _) = app("hi", None);
        a.handle(key(KeyCode::Esc));
        assert!(a.should_quit());

        let (mut b, _) = app("hi", None);
        b.handle(ctrl('c'));
        assert!(b.should_quit());
        assert_eq!(b.engine.input().value(), "");
    }

    #[test]
    fn completion_shows_message_then_clears_it() {
        let (mut app, clock) = app("hi", None);
        clock.advance(Duration::from_secs(6));
        type_str(&mut app, "hi");

        assert_eq!(
            app.message.text(),
            Some("Congratulations! Your speed: 10 WPM, Accuracy: 100%. New text in 5 seconds...")
        );
        assert_eq!(app.completed_sessions(), 1);
        assert_eq!(app.restart_countdown(), Some(5));

        clock.advance(Duration::from_secs(3));
        app.handle(AppEvent::Tick);
        assert_eq!(app.message.text(), None);
        assert_eq!(app.engine.session().id(), 1);
        assert_eq!(app.restart_countdown(), Some(2));

        clock.advance(Duration::from_secs(2));
        app.handle(AppEvent::Tick);
        assert_eq!(app.engine.session().id(), 2);
        assert_eq!(app.restart_countdown(), None);
    }

    #[test]
    fn tab_and_ctrl_r_restart() {
        let (mut app, _) = app("hello", None);
        type_str(&mut app, "he");

        app.handle(key(KeyCode::Tab));
        assert_eq!(app.engine.session().id(), 2);
        assert_eq!(app.engine.session().typed_index(), 0);

        app.handle(ctrl('r'));
        assert_eq!(app.engine.session().id(), 3);
    }

    #[test]
    fn backspace_edits_input() {
        let (mut app, _) = app("hello", None);
        type_str(&mut app, "hex");
        app.handle(key(KeyCode::Backspace));

        assert_eq!(app.engine.input().value(), "he");
        assert_eq!(app.engine.session().typed_index(), 4);
        assert_eq!(app.engine.session().error_count(), 2);
    }

    #[test]
    fn flash_fades() {
        let (mut app, clock) = app("hello", None);
        assert_eq!(app.flash(), None);

        type_str(&mut app, "x");
        assert_eq!(app.flash(), Some(Signal::Error));

        clock.advance(FLASH);
        assert_eq!(app.flash(), None);
    }

    #[test]
    fn completed_sessions_are_logged_to_history() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let (mut app, clock) = app("ok", Some(log.clone()));

        clock.advance(Duration::from_secs(3));
        type_str(&mut app, "ox");

        let records = log.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].phrase, "ok");
        assert_eq!(records[0].accuracy, 50);
        assert_eq!(records[0].errors, 1);
        assert_eq!(records[0].elapsed_secs, 3.0);
    }
}
