//! Diagnostics sinks for the translators.
//!
//! Translators only ever report through a [`LogSink`]; nothing they log feeds
//! back into control flow. The default sink discards everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

/// Injectable diagnostics collaborator shared by all translators.
pub trait LogSink: Send + Sync {
    fn log(&self, entry: LogEntry);

    fn debug(&self, component: &str, message: String) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    fn info(&self, component: &str, message: String) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    fn warn(&self, component: &str, message: String) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    fn error(&self, component: &str, message: String) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    fn log_with_context(
        &self,
        level: LogLevel,
        component: &str,
        message: String,
        context: serde_json::Value,
    ) {
        self.log(LogEntry::new(level, component, message).with_context(context));
    }
}

pub type SharedSink = Arc<dyn LogSink>;

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _entry: LogEntry) {}
}

#[must_use]
pub fn noop() -> SharedSink {
    Arc::new(NoopSink)
}

/// Forwards entries to the `tracing` subscriber installed by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, entry: LogEntry) {
        let component = entry.component.as_str();
        let context = entry.context.as_ref();
        match entry.level {
            LogLevel::Debug => tracing::debug!(component, context = ?context, "{}", entry.message),
            LogLevel::Info => tracing::info!(component, context = ?context, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(component, context = ?context, "{}", entry.message),
            LogLevel::Error => tracing::error!(component, context = ?context, "{}", entry.message),
        }
    }
}

/// Ring-buffer logger, optionally persisted to JSONL.
pub struct Logger {
    entries: VecDeque<LogEntry>,
    file_path: Option<std::path::PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl Logger {
    /// Memory-only ring buffer.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            entries: VecDeque::new(),
            file_path: None,
            writer: None,
        }
    }

    /// Ring buffer backed by a JSONL file; existing entries are reloaded.
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = VecDeque::with_capacity(MAX_LOG_ENTRIES);

        if file_path.exists() {
            let file = File::open(&file_path)?;
            let reader = BufReader::new(file);
            for line in reader.lines().map_while(std::result::Result::ok) {
                if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
                    if entries.len() >= MAX_LOG_ENTRIES {
                        entries.pop_front();
                    }
                    entries.push_back(entry);
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        Ok(Self {
            entries,
            file_path: Some(file_path),
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn log(&mut self, entry: LogEntry) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(writer, "{json}");
                let _ = writer.flush();
            }
        }
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Rewrite the backing file with only the retained entries.
    pub fn compact(&mut self) -> std::io::Result<()> {
        let Some(path) = self.file_path.clone() else {
            return Ok(());
        };
        self.writer = None;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            if let Ok(json) = serde_json::to_string(entry) {
                writeln!(writer, "{json}")?;
            }
        }
        writer.flush()?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

#[derive(Clone)]
pub struct SharedLogger(Arc<Mutex<Logger>>);

impl SharedLogger {
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self(Arc::new(Mutex::new(Logger::new(file_path)?))))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self(Arc::new(Mutex::new(Logger::in_memory())))
    }

    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.0.lock().map(|l| l.recent(limit)).unwrap_or_default()
    }

    pub fn compact(&self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut logger) => logger.compact(),
            Err(_) => Ok(()),
        }
    }
}

impl LogSink for SharedLogger {
    fn log(&self, entry: LogEntry) {
        if let Ok(mut logger) = self.0.lock() {
            logger.log(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_recent_is_newest_first() {
        let logger = SharedLogger::in_memory();
        logger.info("request", "first".to_string());
        logger.warn("request", "second".to_string());

        let recent = logger.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
        assert_eq!(recent[0].level, LogLevel::Warn);
        assert_eq!(recent[1].component, "request");
    }

    #[test]
    fn test_jsonl_entries_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("bridge.jsonl");

        {
            let logger = SharedLogger::new(&path).unwrap();
            logger.log_with_context(
                LogLevel::Debug,
                "stream",
                "dropped key".to_string(),
                serde_json::json!({"key": "abc"}),
            );
        }

        let reopened = SharedLogger::new(&path).unwrap();
        let recent = reopened.recent(5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].context, Some(serde_json::json!({"key": "abc"})));

        reopened.compact().unwrap();
        assert_eq!(SharedLogger::new(&path).unwrap().recent(5).len(), 1);
    }

    #[test]
    fn test_noop_sink_accepts_everything() {
        let sink = noop();
        sink.error("response", "ignored".to_string());
    }
}
