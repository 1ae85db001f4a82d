/// User-facing notifications
///
/// Mutating page operations report their outcome as a flash-style
/// notification. The HTTP layer hands them to the client together with the
/// redirect target; the host UI shows each one once.

use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// A single message for the end user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: Level,

    /// Message text
    pub text: String,
}

impl Notification {
    /// Creates a notification with the given level
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Creates a success notification
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Level::Success, text)
    }
}
