use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use typequote::app::App;
use typequote::clock::ManualClock;
use typequote::engine::{Engine, EngineEvent, Timing};
use typequote::feedback::Silent;
use typequote::history::HistoryLog;
use typequote::phrases::{BuiltinPool, PhrasePool};
use typequote::runtime::{AppEvent, ChannelEventSource, Runner};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn headless_app(pool: PhrasePool, history: Option<HistoryLog>) -> (App<ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let engine = Engine::with_rng(
        pool,
        clock.clone(),
        Box::new(Silent),
        Timing::default(),
        StdRng::seed_from_u64(42),
    );
    (App::new(engine, Duration::from_secs(3), history), clock)
}

// Drives the app through the runtime without a TTY: keystrokes arrive over
// the channel, and every idle step becomes a tick.
#[test]
fn headless_typing_flow_completes_and_restarts() {
    let (mut app, clock) = headless_app(PhrasePool::single("cat").unwrap(), None);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(2));

    for c in "cxt".chars() {
        tx.send(key(c)).unwrap();
    }

    for _ in 0..3 {
        clock.advance(Duration::from_millis(500));
        app.handle(runner.step());
    }

    let session = app.engine.session();
    assert!(session.completed());
    assert_eq!(session.typed_index(), 3);
    assert_eq!(session.error_count(), 1);
    assert_eq!(app.engine.score().accuracy, 67);
    assert!(app.message.text().is_some());

    // nothing typed during the cooldown reaches the session
    tx.send(key('z')).unwrap();
    app.handle(runner.step());
    assert_eq!(app.engine.session().typed_index(), 3);
    assert_eq!(app.engine.input().value(), "cxt");

    // idle ticks until the automatic restart
    for _ in 0..60u32 {
        clock.advance(Duration::from_millis(100));
        app.handle(runner.step());
        if app.engine.session().id() == 2 {
            break;
        }
    }

    let session = app.engine.session();
    assert_eq!(session.id(), 2);
    assert_eq!(session.typed_index(), 0);
    assert_eq!(session.error_count(), 0);
    assert!(!session.completed());
    assert!(app.engine.input().is_enabled());
    assert_eq!(app.completed_sessions(), 1);
}

#[test]
fn timer_ticks_only_while_session_is_live() {
    let (mut app, clock) = headless_app(PhrasePool::single("hello world").unwrap(), None);
    app.engine.drain_events();

    for _ in 0..25u32 {
        clock.advance(Duration::from_millis(100));
        app.engine.poll();
    }
    let ticks = app
        .engine
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::Tick { .. }))
        .count();
    assert_eq!(ticks, 2);
    assert_eq!(app.engine.elapsed_secs(), 2);

    for c in "hello world".chars() {
        app.handle(key(c));
    }
    app.engine.drain_events();

    for _ in 0..60u32 {
        clock.advance(Duration::from_millis(100));
        app.engine.poll();
    }
    assert_matches!(
        app.engine.drain_events().as_slice(),
        [EngineEvent::Started { session_id: 2, .. }, ..]
    );
}

#[test]
fn builtin_pool_session_can_be_typed_perfectly() {
    let pool = PhrasePool::builtin(BuiltinPool::Motivational).unwrap();
    let (mut app, clock) = headless_app(pool, None);
    let phrase = app.engine.session().target_text().to_string();

    clock.advance(Duration::from_secs(10));
    for c in phrase.chars() {
        app.handle(key(c));
    }

    assert!(app.engine.session().completed());
    assert_eq!(app.engine.score().accuracy, 100);
    let words = phrase.split_whitespace().count() as u32;
    assert_eq!(app.engine.score().wpm, words * 6);
}

#[test]
fn finished_sessions_land_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("history.csv"));
    let (mut app, clock) = headless_app(PhrasePool::single("go").unwrap(), Some(log.clone()));

    for round in 0..3u64 {
        clock.advance(Duration::from_secs(1 + round));
        app.handle(key('g'));
        app.handle(key('o'));
        clock.advance(Duration::from_secs(5));
        app.handle(AppEvent::Tick);
    }

    let records = log.load().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.accuracy == 100 && r.phrase == "go"));
    assert_eq!(records[0].wpm, 60);
    assert_eq!(records[2].wpm, 20);
}
