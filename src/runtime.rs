use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How often the loop wakes up when no input arrives. Finer than the engine's
/// one-second timer so deadlines and the feedback flash stay responsive.
pub const UI_TICK: Duration = Duration::from_millis(100);

/// Everything the app loop reacts to.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait EventSource {
    /// Waits up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Channel-backed source. The terminal reader thread and tests both feed it.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Spawns a thread forwarding crossterm key presses and resizes.
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("terminal-events".to_string())
            .spawn(move || forward_terminal_events(tx));
        if let Err(e) = spawned {
            log::error!("terminal event thread failed to start: {e}");
        }
        Self { rx }
    }
}

fn forward_terminal_events(tx: Sender<AppEvent>) {
    loop {
        let ev = match event::read() {
            // release/repeat events are reported on some platforms; only
            // presses type characters
            Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::error!("reading terminal events: {e}");
                break;
            }
        };
        if tx.send(ev).is_err() {
            break;
        }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the application one event at a time.
pub struct Runner<E: EventSource> {
    source: E,
    tick: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self { source, tick }
    }

    /// Next event, or `Tick` once the interval passes without one.
    pub fn step(&self) -> AppEvent {
        match self.source.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                // nothing left to wait on; keep the clock-driven parts alive
                thread::sleep(self.tick);
                AppEvent::Tick
            }
        }
    }
}
