use std::io::{stderr, Write};

use ruskview_core::{Notice, NoticeKind, Notifier};

/// Prints notices to stderr so stdout stays clean for JSON output.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
        };
        let mut err = stderr().lock();
        let _ = match &notice.message {
            Some(message) => writeln!(err, "[{}] {}: {}", tag, notice.title, message),
            None => writeln!(err, "[{}] {}", tag, notice.title),
        };
    }
}
