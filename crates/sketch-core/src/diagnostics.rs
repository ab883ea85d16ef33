//! User-visible diagnostics.
//!
//! Mirrors the shape of a linter's findings list: severity-tagged,
//! short-reason records that accumulate on the façade without aborting
//! anything. Nothing here mutates a document — a `Diagnostic` is always a
//! report about something the caller asked for that didn't happen.

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The requested action was rejected; nothing changed.
    Warning,
    /// Informational — surfaced for visibility, not a rejection.
    Info,
}

/// A single diagnostic raised by the kernel.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Short, stable rule identifier (e.g. `"constraint-arity"`), useful for
    /// a host UI that wants to deduplicate or filter by kind.
    pub rule: &'static str,
}

impl Diagnostic {
    pub fn warning(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
            rule,
        }
    }
}
