//! User-facing notifications (toasts).
//!
//! The flow never surfaces external failures as errors; it converts them to
//! notices and hands them to whatever sink the host app provides.

use std::sync::Mutex;

/// Severity of a notice, mapped to toast styling by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// A failed action.
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message text shown to the user.
    pub message: String,
    /// Notice severity.
    pub kind: NoticeKind,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
        }
    }

    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// Sink for user-facing notifications. Implemented by the host app's toast
/// layer; must be cheap and non-blocking.
pub trait NotifySink: Send + Sync {
    /// Deliver a notice to the user.
    fn notify(&self, notice: Notice);
}

/// A sink that drops every notice. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotifySink for NullSink {
    fn notify(&self, _notice: Notice) {}
}

/// A sink that records every notice, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<Notice>>,
}

impl MemorySink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices delivered so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether any notice of the given kind was delivered.
    #[must_use]
    pub fn has_kind(&self, kind: NoticeKind) -> bool {
        self.notices().iter().any(|n| n.kind == kind)
    }
}

impl NotifySink for MemorySink {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notice);
    }
}
