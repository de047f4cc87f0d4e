//! Diagnostic notices for recoverable problems.
//!
//! Malformed activities, missing invoke targets, duplicate pipelines and
//! dangling references never abort a resolution pass. They are reported
//! through a [`DiagnosticSink`] and retained on the reference store.

mod notice;
mod sink;

pub use notice::{Diagnostic, DiagnosticCode};
pub use sink::{CollectingDiagnosticSink, DiagnosticSink, LoggingDiagnosticSink, NoOpDiagnosticSink};

#[cfg(test)]
pub use sink::MockDiagnosticSink;
