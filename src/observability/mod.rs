//! Observability for explainer sessions
//!
//! - Structured JSON log lines
//! - Lifecycle events
//! - Begin/complete scopes around derivations
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No effect on derived results
//! 3. No background threads
//! 4. Deterministic output (apart from elapsed times)
//!
//! # Usage
//!
//! ```ignore
//! use ruleview::observability::{Event, Logger, ObservationScope};
//!
//! let logger = Logger::default().with_session("3f2c...");
//! logger.log_event(Event::SessionStart, &[("rules", "120")]);
//!
//! let scope = ObservationScope::new(&logger, "DERIVE");
//! // ... run the chain ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{LogSink, Logger, Severity};
pub use scope::ObservationScope;

impl Logger {
    /// Log a lifecycle event; rejected commands are warnings, the rest info
    pub fn log_event(&self, event: Event, fields: &[(&str, &str)]) {
        let severity = match event {
            Event::CommandRejected => Severity::Warn,
            _ => Severity::Info,
        };
        self.log(severity, event.as_str(), fields);
    }
}
