use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Acknowledgement requested for a judged keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Success,
    Error,
}

/// Fire-and-forget sink for keystroke acknowledgements. Implementations must
/// not fail or block the keystroke path; a new signal simply supersedes the
/// previous one.
pub trait Feedback {
    fn signal(&mut self, signal: Signal);
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackMode {
    /// terminal bell on mistakes
    #[default]
    Bell,
    /// terminal bell on every judged keystroke
    All,
    /// no audible feedback
    Off,
}

impl FeedbackMode {
    pub fn into_feedback(self) -> Box<dyn Feedback> {
        self.with_output(io::stdout())
    }

    fn with_output<W: Write + 'static>(self, out: W) -> Box<dyn Feedback> {
        match self {
            FeedbackMode::Bell => Box::new(TerminalBell::new(out)),
            FeedbackMode::All => Box::new(TerminalBell::new(out).ring_on_success(true)),
            FeedbackMode::Off => Box::new(Silent),
        }
    }
}

/// Rings the terminal bell (BEL) on errors, and on successes too when asked.
pub struct TerminalBell<W: Write> {
    out: W,
    on_success: bool,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            on_success: false,
        }
    }

    pub fn ring_on_success(mut self, on: bool) -> Self {
        self.on_success = on;
        self
    }

    fn ring(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

impl<W: Write> Feedback for TerminalBell<W> {
    fn signal(&mut self, signal: Signal) {
        if signal == Signal::Success && !self.on_success {
            return;
        }
        if let Err(e) = self.ring() {
            log::trace!("bell for {signal:?} dropped: {e}");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Feedback for Silent {
    fn signal(&mut self, _signal: Signal) {}
}
