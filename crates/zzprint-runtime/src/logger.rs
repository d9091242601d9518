//! In-memory application log
//!
//! [`AppLogger`] implements [`log::Log`], keeping the most recent entries
//! for display and optionally echoing each one to stderr.

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] LEVEL message`
    pub fn format_line(&self) -> String {
        format!(
            "[{}] {:<5} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
    echo_stderr: bool,
}

impl AppLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            max_entries,
            level: LevelFilter::Info,
            echo_stderr: false,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Also print every entry to stderr as it is logged
    pub fn with_stderr(mut self, echo: bool) -> Self {
        self.echo_stderr = echo;
        self
    }

    /// Install as the global logger. The returned handle shares entries
    /// with the installed one.
    pub fn init(self) -> Result<Self, log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(self)
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn latest_message(&self) -> Option<String> {
        self.lock().last().map(|entry| entry.message.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        };

        if self.echo_stderr {
            eprintln!("{}", entry.format_line());
        }

        let mut entries = self.lock();
        entries.push(entry);

        // Keep only the most recent entries
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(0..excess);
        }
    }

    fn flush(&self) {}
}
