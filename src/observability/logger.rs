//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining keys alphabetical
//! - Synchronous, no buffering
//! - Every line of a session carries its `session_id`

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-derivation detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Session cannot continue
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination of log lines
#[derive(Debug, Clone)]
pub enum LogSink {
    /// TRACE/INFO/WARN to stdout, ERROR/FATAL to stderr
    Stdio,
    /// Everything to stderr; keeps stdout free for protocol output
    Stderr,
    /// Discard everything
    Silent,
    /// Collect lines in memory
    Memory(Arc<Mutex<Vec<String>>>),
}

/// A structured logger bound to one explainer session
#[derive(Debug, Clone)]
pub struct Logger {
    session_id: Option<String>,
    sink: LogSink,
}

impl Logger {
    /// Create a logger writing to the given sink
    pub fn new(sink: LogSink) -> Self {
        Self {
            session_id: None,
            sink,
        }
    }

    /// Create a logger that discards everything
    pub fn silent() -> Self {
        Self::new(LogSink::Silent)
    }

    /// Create a logger collecting lines in memory, returning the shared buffer
    pub fn memory() -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (Self::new(LogSink::Memory(Arc::clone(&buffer))), buffer)
    }

    /// Attach a session id to every subsequent line
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Session id carried by this logger
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Log an event with the given severity and fields
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let mut all_fields: Vec<(&str, &str)> = fields.to_vec();
        if let Some(ref id) = self.session_id {
            all_fields.push(("session_id", id.as_str()));
        }

        match &self.sink {
            LogSink::Silent => {}
            LogSink::Stdio if severity < Severity::Error => {
                let line = render(severity, event, &all_fields);
                let _ = write_line(&mut io::stdout(), &line);
            }
            LogSink::Stdio | LogSink::Stderr => {
                let line = render(severity, event, &all_fields);
                let _ = write_line(&mut io::stderr(), &line);
            }
            LogSink::Memory(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(render(severity, event, &all_fields));
                }
            }
        }
    }

    /// Log at TRACE level
    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }

    /// Log at FATAL level
    pub fn fatal(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Fatal, event, fields);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogSink::Stdio)
    }
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    // One write per line
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(b'\n');
    writer.write_all(&bytes)?;
    writer.flush()
}

/// Render one JSON log line without the trailing newline
pub(crate) fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(128);

    output.push_str("{\"event\":\"");
    escape_json_string(&mut output, event);
    output.push_str("\",\"severity\":\"");
    output.push_str(severity.as_str());
    output.push('"');

    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted_fields {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push('}');
    output
}

fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}
