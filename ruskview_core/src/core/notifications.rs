use std::time::Duration;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Default display time for notices that do not need confirmation.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(3);
/// Failures stay up a little longer.
pub const ERROR_NOTICE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Warning,
}

/// An outcome for the UI to show.
///
/// Notices with `requires_confirmation` stay until dismissed; the rest
/// disappear after `duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: Option<String>,
    pub requires_confirmation: bool,
    pub duration: Duration,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>) -> Self {
        let duration = match kind {
            NoticeKind::Error => ERROR_NOTICE_DURATION,
            _ => DEFAULT_NOTICE_DURATION,
        };
        Self {
            kind,
            title: title.into(),
            message: None,
            requires_confirmation: false,
            duration,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn confirm(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }
}

/// Outcome sink implemented by whatever displays notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log. Used when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message.as_deref().unwrap_or("");
        match notice.kind {
            NoticeKind::Error => error!("{}: {}", notice.title, message),
            NoticeKind::Warning => warn!("{}: {}", notice.title, message),
            NoticeKind::Success | NoticeKind::Info => info!("{}: {}", notice.title, message),
        }
    }
}
