//! User-facing notifications.
//!
//! Export, import and save operations report their outcome through a
//! [`Notifier`] so a front end can show it; every notification is also logged.

use std::fmt;
use std::sync::Mutex;
use tracing::{error, info};

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The operation succeeded
    Success,
    /// The operation failed
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Success => f.write_str("success"),
            NoticeKind::Error => f.write_str("error"),
        }
    }
}

/// Receives transient, human-readable outcome messages.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn notify(&self, kind: NoticeKind, message: &str);

    /// Shorthand for a success notification.
    fn success(&self, message: &str) {
        self.notify(NoticeKind::Success, message);
    }

    /// Shorthand for a failure notification.
    fn failure(&self, message: &str) {
        self.notify(NoticeKind::Error, message);
    }
}

/// Prints notifications to the terminal: successes to stdout, failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => {
                info!(kind = %kind, "{}", message);
                println!("✓ {}", message);
            }
            NoticeKind::Error => {
                error!(kind = %kind, "{}", message);
                eprintln!("✗ {}", message);
            }
        }
    }
}

/// Sends notifications to the log only; used by the background worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => info!(kind = %kind, "{}", message),
            NoticeKind::Error => error!(kind = %kind, "{}", message),
        }
    }
}

/// Keeps every notification in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((kind, message.to_string()));
        }
    }
}
