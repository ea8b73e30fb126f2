use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber, field::Visit};
use tracing_subscriber::layer::{Context, Layer};

/// Maximum number of entries retained in the shared buffer.
pub const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: tracing::Level,
    pub timestamp: String,
    pub message: String,
    pub target: String,
}

impl LogEntry {
    pub fn new(level: tracing::Level, message: String, target: String) -> Self {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        Self {
            level,
            timestamp,
            message,
            target,
        }
    }

    /// Entry for one line of subprocess output, with the level taken from
    /// the tracing prefix the CLI prints.
    pub fn from_cli_line(line: &str) -> Self {
        Self::new(level_from_line(line), line.to_string(), "protprep".to_string())
    }
}

/// Guess the level of a formatted tracing line such as
/// `2026-01-01T00:00:00Z  WARN [DOWNLOAD] Attempt 1/3 failed`.
pub fn level_from_line(line: &str) -> Level {
    let head: String = line.chars().take(48).collect();
    if head.contains("ERROR") {
        Level::ERROR
    } else if head.contains(" WARN") {
        Level::WARN
    } else if head.contains("DEBUG") {
        Level::DEBUG
    } else if head.contains("TRACE") {
        Level::TRACE
    } else {
        Level::INFO
    }
}

static LOG_BUFFER: once_cell::sync::Lazy<Arc<Mutex<Vec<LogEntry>>>> =
    once_cell::sync::Lazy::new(|| Arc::new(Mutex::new(Vec::new())));

pub fn get_log_buffer() -> Arc<Mutex<Vec<LogEntry>>> {
    LOG_BUFFER.clone()
}

/// Append an entry to the shared buffer, dropping the oldest past the cap.
pub fn push_entry(entry: LogEntry) {
    if let Ok(mut buf) = LOG_BUFFER.lock() {
        buf.push(entry);
        if buf.len() > MAX_LOG_ENTRIES {
            buf.remove(0);
        }
    }
}

pub struct GuiLogLayer;

impl GuiLogLayer {
    pub fn new() -> Self {
        Self
    }
}

struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

impl<S> Layer<S> for GuiLogLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        let message = if !visitor.message.is_empty() {
            visitor.message
        } else {
            metadata.target().to_string()
        };

        push_entry(LogEntry::new(
            *metadata.level(),
            message,
            metadata.target().to_string(),
        ));
    }
}
