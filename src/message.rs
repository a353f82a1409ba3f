use std::time::{Duration, SystemTime};

/// Transient message line. Each message clears itself after `timeout`,
/// independently of anything the engine schedules.
#[derive(Debug, Clone)]
pub struct MessageArea {
    timeout: Duration,
    text: Option<String>,
    clear_at: Option<SystemTime>,
}

impl MessageArea {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            text: None,
            clear_at: None,
        }
    }

    /// A timeout too large to represent keeps the message up until the next
    /// one replaces it.
    pub fn show(&mut self, text: impl Into<String>, now: SystemTime) {
        self.text = Some(text.into());
        self.clear_at = now.checked_add(self.timeout);
    }

    /// Clears the message once its timeout has passed.
    pub fn expire(&mut self, now: SystemTime) {
        if self.clear_at.is_some_and(|at| now >= at) {
            self.text = None;
            self.clear_at = None;
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
