//! User-facing notifications (toasts).
//!
//! Resource operations report outcomes through a [`Notifier`] instead of
//! returning UI state. Views decide how to render them; the CLI prints them,
//! tests collect them from a channel.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{ApiError, ErrorKind};

pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(4);
/// Permission failures stay on screen longer.
pub const PROMINENT_NOTICE_DURATION: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration: Duration,
    pub prominent: bool,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into(), duration: DEFAULT_NOTICE_DURATION, prominent: false }
    }

    /// Notice for a failed operation.
    ///
    /// Network failures use `fallback` since the transport text means nothing
    /// to an operator. Permission failures are prominent.
    #[must_use]
    pub fn from_error(err: &ApiError, fallback: &str) -> Self {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Network => fallback.to_owned(),
            _ => {
                let text = err.user_message();
                if text.trim().is_empty() { fallback.to_owned() } else { text }
            }
        };
        let prominent = kind == ErrorKind::Authorization;
        Self {
            level: NoticeLevel::Error,
            message,
            duration: if prominent { PROMINENT_NOTICE_DURATION } else { DEFAULT_NOTICE_DURATION },
            prominent,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(message = %notice.message, "notice"),
            NoticeLevel::Error if notice.prominent => {
                tracing::error!(message = %notice.message, "permission notice");
            }
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "error notice"),
        }
    }
}

/// Forwards notices to a channel consumed by a view.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice receiver dropped");
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
