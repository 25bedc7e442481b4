//! Diagnostic logger handed to the conversion engine.
//!
//! The engine only sees `&mut dyn` [`Logger`] and calls
//! [`Logger::emit`] with a [`Level`] and a [`Message`], either plain text or a
//! JSON document. Where the message ends up is decided by the orchestrator:
//!
//! * [`ConsoleLogger`] prints every message immediately. `error` and `fatal`
//!   go to stderr, everything else to stdout. JSON messages are
//!   pretty-printed.
//! * [`CaptureLogger`] prints nothing and keeps `{level, message}` entries in
//!   call order. The orchestrator writes them once, as a pretty-printed JSON
//!   array, when the run is over.
//!
//! [`DiagnosticLogger`] is the closed set of the two, so the orchestrator can
//! get the captured entries back without downcasting.
//!
//! This is the user-facing channel. Internal library tracing goes through
//! the `tracing` crate and never lands in the captured log.

use crate::config::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};

/// Message severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic payload: a line of text or a structured document.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Json(Value),
}

impl Message {
    /// The message as a JSON value; text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Message::Text(s) => Value::String(s),
            Message::Json(v) => v,
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<Value> for Message {
    fn from(v: Value) -> Self {
        Message::Json(v)
    }
}

/// One captured diagnostic as it appears in the log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: Level,
    pub message: Value,
}

/// Sink for diagnostics emitted during a conversion.
///
/// Callers never need to know which implementation is behind the trait
/// object; both accept both message shapes.
pub trait Logger {
    /// Record one message.
    fn emit(&mut self, level: Level, message: Message);

    fn debug(&mut self, message: Message) {
        self.emit(Level::Debug, message);
    }

    fn info(&mut self, message: Message) {
        self.emit(Level::Info, message);
    }

    fn warn(&mut self, message: Message) {
        self.emit(Level::Warn, message);
    }

    fn error(&mut self, message: Message) {
        self.emit(Level::Error, message);
    }

    fn fatal(&mut self, message: Message) {
        self.emit(Level::Fatal, message);
    }
}

// ── Console ──────────────────────────────────────────────────────────────

/// Prints each message as it arrives.
pub struct ConsoleLogger {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl ConsoleLogger {
    /// Logger bound to the process's stdout and stderr.
    pub fn stdio() -> Self {
        Self::with_streams(io::stdout(), io::stderr())
    }

    /// Logger bound to arbitrary streams. `err` receives `error` and above.
    pub fn with_streams(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::stdio()
    }
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger").finish_non_exhaustive()
    }
}

impl Logger for ConsoleLogger {
    fn emit(&mut self, level: Level, message: Message) {
        let text = match message {
            Message::Text(s) => s,
            Message::Json(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()),
        };
        let stream = if level >= Level::Error {
            &mut self.err
        } else {
            &mut self.out
        };
        // The console is the sink of last resort; there is nowhere to report
        // a failure to write to it.
        let _ = writeln!(stream, "{text}");
        let _ = stream.flush();
    }
}

// ── Capture ──────────────────────────────────────────────────────────────

/// Keeps every message in memory, in call order.
#[derive(Debug, Default, Clone)]
pub struct CaptureLogger {
    entries: Vec<LogEntry>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// The full log as a pretty-printed JSON array.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

impl Logger for CaptureLogger {
    fn emit(&mut self, level: Level, message: Message) {
        self.entries.push(LogEntry {
            level,
            message: message.into_json(),
        });
    }
}

// ── Selection ────────────────────────────────────────────────────────────

/// The logger variant chosen for a run.
#[derive(Debug)]
pub enum DiagnosticLogger {
    Console(ConsoleLogger),
    Capture(CaptureLogger),
}

impl DiagnosticLogger {
    /// Capture when a log file is configured, console otherwise.
    pub fn for_config(config: &Configuration) -> Self {
        if config.capture_logs() {
            DiagnosticLogger::Capture(CaptureLogger::new())
        } else {
            DiagnosticLogger::Console(ConsoleLogger::stdio())
        }
    }

    /// The captured entries, if this is the capture variant.
    pub fn captured(&self) -> Option<&CaptureLogger> {
        match self {
            DiagnosticLogger::Capture(c) => Some(c),
            DiagnosticLogger::Console(_) => None,
        }
    }
}

impl Logger for DiagnosticLogger {
    fn emit(&mut self, level: Level, message: Message) {
        match self {
            DiagnosticLogger::Console(c) => c.emit(level, message),
            DiagnosticLogger::Capture(c) => c.emit(level, message),
        }
    }
}
