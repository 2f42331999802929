//! # Notification Errors

use thiserror::Error;

/// Result type for change notification
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Change notification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Nobody is listening any more
    #[error("Notification channel closed")]
    Closed,
}

impl NotifyError {
    pub fn code(&self) -> &'static str {
        match self {
            NotifyError::Closed => "NOTIFY_CLOSED",
        }
    }
}
