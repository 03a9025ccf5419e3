//! Transient notifications (snackbar)

use std::time::{Duration, Instant};

/// Default auto-hide delay
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(6000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

/// Holds at most one notification; a new one replaces the old
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<Notification>,
    auto_hide: Duration,
}

impl Notifier {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message.into(), Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message.into(), Severity::Error);
    }

    fn show(&mut self, message: String, severity: Severity) {
        self.current = Some(Notification {
            message,
            severity,
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Latest notification, whether or not it has expired
    pub fn latest(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Notification still on screen at `now`
    pub fn visible_at(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.auto_hide)
    }

    pub fn visible(&self) -> Option<&Notification> {
        self.visible_at(Instant::now())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}
