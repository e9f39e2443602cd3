//! Append-only event log.
//!
//! Each event becomes one line, `<YYYY-MM-DD HH:MM:SS> [info|error] <message>`.
//! The file is opened, appended and closed on every call so no handle is held
//! across the run. Write failures go to stderr and never abort the monitor.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Timestamp layout shared by log lines and the write probe.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Event log writer, constructed once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
    echo: bool,
}

impl EventLog {
    /// Create a log writing to `path` (if any), echoing to stdout when `echo`.
    pub fn new(path: Option<PathBuf>, echo: bool) -> Self {
        Self { path, echo }
    }

    /// A log that records nothing.
    pub const fn disabled() -> Self {
        Self {
            path: None,
            echo: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.write(Severity::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write(Severity::Error, message.as_ref());
    }

    /// Record one event.
    pub fn write(&self, severity: Severity, message: &str) {
        self.write_with_console(severity, message, &mut std::io::stdout().lock());
    }

    fn write_with_console(&self, severity: Severity, message: &str, console: &mut impl Write) {
        let line = format_line(&timestamp(), severity, message);

        if self.echo {
            let _ = writeln!(console, "{line}");
        }

        let Some(path) = &self.path else {
            return;
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{line}"));

        if let Err(e) = result {
            eprintln!("error writing to log file {}: {}", path.display(), e);
        }
    }
}

/// Render a single log line.
pub fn format_line(timestamp: &str, severity: Severity, message: &str) -> String {
    format!("{timestamp} [{severity}] {message}")
}
