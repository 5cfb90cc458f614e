//! ObservationScope for begin/complete logging around a unit of work
//!
//! - `{name}_BEGIN` at TRACE on creation
//! - `{name}_COMPLETE` at INFO on `complete()`
//! - `{name}_FAILED` at ERROR on `fail()`
//! - `{name}_INCOMPLETE` at WARN if dropped without either

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the start and outcome of a unit of work
pub struct ObservationScope<'a> {
    logger: &'a Logger,
    name: &'a str,
    completed: Cell<bool>,
    started: Instant,
}

impl<'a> ObservationScope<'a> {
    /// Open a scope, logging `{name}_BEGIN`
    pub fn new(logger: &'a Logger, name: &'a str) -> Self {
        logger.trace(&format!("{}_BEGIN", name), &[]);
        Self {
            logger,
            name,
            completed: Cell::new(false),
            started: Instant::now(),
        }
    }

    /// Close the scope successfully, logging `{name}_COMPLETE` with the given
    /// fields and the elapsed time in microseconds
    pub fn complete_with_fields(self, fields: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.started.elapsed().as_micros().to_string();
        let mut all_fields: Vec<(&str, &str)> = fields.to_vec();
        all_fields.push(("elapsed_us", elapsed.as_str()));
        self.logger
            .info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Close the scope successfully without extra fields
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Close the scope as failed
    pub fn fail(self, reason: &str) {
        self.completed.set(true);
        self.logger
            .error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    /// Check if the scope has been closed
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            self.logger.warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
