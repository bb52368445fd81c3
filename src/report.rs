//! Timestamped diagnostics handed back to the caller of a matching run.

use std::fmt::{self, Display};

use chrono::{DateTime, Local};
use log::Level;

/// One diagnostic message of a matching run.
///
/// Displays as `[YYYY-MM-DD HH:MM:SS] message`.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Local time at which the message was recorded.
    pub timestamp: DateTime<Local>,
    /// The message itself.
    pub message: String,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}

/// Collects the log entries of one run and mirrors each to the `log` facade.
#[derive(Clone, Debug, Default)]
pub(crate) struct Report {
    entries: Vec<LogEntry>,
}

impl Report {
    pub(crate) fn push(&mut self, level: Level, message: String) {
        log::log!(level, "{message}");
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message,
        });
    }

    pub(crate) fn info(&mut self, message: String) {
        self.push(Level::Info, message);
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.push(Level::Warn, message);
    }

    pub(crate) fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn display() {
        let entry = LogEntry {
            timestamp: Local.with_ymd_and_hms(2024, 3, 9, 21, 4, 5).unwrap(),
            message: "Matched 4 stars to catalog identities.".to_string(),
        };

        assert_eq!(
            entry.to_string(),
            "[2024-03-09 21:04:05] Matched 4 stars to catalog identities."
        );
    }

    #[test]
    fn keeps_order() {
        let mut report = Report::default();
        report.info("first".to_string());
        report.warn("second".to_string());

        let messages = report
            .into_entries()
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>();
        assert_eq!(messages, ["first", "second"]);
    }
}
