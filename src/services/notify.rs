//! Notification sinks.

use crate::models::notification::Notification;
use colored::Colorize;
use indicatif::ProgressBar;

/// Receives success/failure events from the pipeline.
///
/// Delivery is best effort: a sink must not block for long and cannot fail
/// the run.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Emits every notification as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: &Notification) {
        let server = notification.server_id().unwrap_or("-");
        if notification.is_failure() {
            tracing::warn!(server, "{}", notification);
        } else {
            tracing::info!(server, "{}", notification);
        }
    }
}

/// Prints notifications to stdout as `[OK]` / `[FAIL]` lines.
///
/// With a progress bar attached, lines are printed above it.
#[derive(Default, Clone)]
pub struct ConsoleNotifier {
    progress: Option<ProgressBar>,
}

impl ConsoleNotifier {
    pub fn with_progress(progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
        }
    }

    fn line(notification: &Notification) -> String {
        if notification.is_failure() {
            format!("  {} {}", "[FAIL]".red(), notification)
        } else {
            format!("  {} {}", "[OK]".green(), notification)
        }
    }
}

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        let line = Self::line(notification);
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}
