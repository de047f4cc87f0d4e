//! Diagnostic sink trait and implementations.

use super::Diagnostic;
use parking_lot::RwLock;
use std::str::FromStr;
use tracing::{debug, error, info, trace, warn, Level};

/// Receives diagnostic notices as they are found.
///
/// Emitting must never fail or panic; sinks swallow their own errors.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    /// Emits a diagnostic.
    fn emit(&self, diagnostic: &Diagnostic);
}

/// A sink that discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDiagnosticSink;

impl DiagnosticSink for NoOpDiagnosticSink {
    fn emit(&self, _diagnostic: &Diagnostic) {}
}

/// A sink that logs diagnostics using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingDiagnosticSink {
    level: Level,
}

impl Default for LoggingDiagnosticSink {
    fn default() -> Self {
        Self { level: Level::WARN }
    }
}

impl LoggingDiagnosticSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a sink from a level name such as `"warn"` or `"debug"`.
    ///
    /// Unknown names fall back to `WARN`.
    #[must_use]
    pub fn from_level_name(name: &str) -> Self {
        Self::new(Level::from_str(name).unwrap_or(Level::WARN))
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }
}

impl DiagnosticSink for LoggingDiagnosticSink {
    fn emit(&self, d: &Diagnostic) {
        let code = d.code.to_string();
        let activity = d.activity.as_deref().unwrap_or("");
        let path = d.path.to_string();
        match self.level {
            Level::ERROR => error!(code = %code, pipeline = %d.pipeline, activity, path = %path, "{}", d.message),
            Level::WARN => warn!(code = %code, pipeline = %d.pipeline, activity, path = %path, "{}", d.message),
            Level::INFO => info!(code = %code, pipeline = %d.pipeline, activity, path = %path, "{}", d.message),
            Level::DEBUG => debug!(code = %code, pipeline = %d.pipeline, activity, path = %path, "{}", d.message),
            _ => trace!(code = %code, pipeline = %d.pipeline, activity, path = %path, "{}", d.message),
        }
    }
}

/// A sink that keeps every diagnostic, for tests and report building.
#[derive(Debug, Default)]
pub struct CollectingDiagnosticSink {
    diagnostics: RwLock<Vec<Diagnostic>>,
}

impl CollectingDiagnosticSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.read().clone()
    }

    /// Returns the number of collected diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.read().is_empty()
    }

    /// Clears all collected diagnostics.
    pub fn clear(&self) {
        self.diagnostics.write().clear();
    }
}

impl DiagnosticSink for CollectingDiagnosticSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.diagnostics.write().push(diagnostic.clone());
    }
}
