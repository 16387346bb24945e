//! Transient user-facing notices raised by the request interceptor.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// How long an error notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Severity shown with a notice. Only failures are surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), duration: NOTICE_DURATION }
    }
}

/// Sink for notices. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Emits notices as log events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        let duration_ms = u64::try_from(notice.duration.as_millis()).unwrap_or(u64::MAX);
        match notice.level {
            NoticeLevel::Error => tracing::error!(duration_ms, "{}", notice.message),
        }
    }
}

/// Keeps every notice it receives, in order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice.clone());
    }
}
