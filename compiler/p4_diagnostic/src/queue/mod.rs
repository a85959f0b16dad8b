//! Diagnostic queue shared by every pass of one frontend run.
//!
//! Features:
//! - Error and warning counters
//! - A running count of every error reported, kept or not (the pass manager
//!   compares it before and after each pass to implement stop-on-error)
//! - Error limit to avoid overwhelming output
//! - Deduplication of identical diagnostics reported by repeated passes
//! - Optional sink that observes each accepted diagnostic as it arrives

use std::fmt;

use p4_ir::Span;

use crate::{Diagnostic, ErrorCode, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 100,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Callback observing every diagnostic the queue accepts.
pub type DiagnosticSink = Box<dyn FnMut(&Diagnostic)>;

/// Queue for collecting and counting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.push(Diagnostic::error(ErrorCode::E1001).with_message("..."));
/// assert_eq!(queue.error_count(), 1);
/// let sorted = queue.flush();
/// ```
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors rejected because the limit was reached.
    suppressed: usize,
    /// Every error pushed, including duplicates and suppressed ones.
    /// Never reset.
    reported_errors: usize,
    config: DiagnosticConfig,
    sink: Option<DiagnosticSink>,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            suppressed: 0,
            reported_errors: 0,
            config,
            sink: None,
        }
    }

    /// Forward every accepted diagnostic to `sink` as well as queueing it.
    #[must_use]
    pub fn with_sink(mut self, sink: impl FnMut(&Diagnostic) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error {
            self.reported_errors += 1;
        }

        if is_error && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }

        if self.config.deduplicate && self.diagnostics.contains(&diag) {
            return false;
        }

        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }

        if let Some(sink) = self.sink.as_mut() {
            sink(&diag);
        }
        self.diagnostics.push(diag);
        true
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of errors reported since the queue was created.
    ///
    /// Unlike [`error_count`](Self::error_count) this also counts errors the
    /// queue dropped as duplicates or past the limit, and survives `flush`.
    pub fn reported_errors(&self) -> usize {
        self.reported_errors
    }

    /// Get the number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Number of errors dropped because of the error limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get diagnostics without clearing the queue, in arrival order.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort diagnostics by position and return them.
    ///
    /// Diagnostics on synthesized nodes sort after positioned ones; ties keep
    /// arrival order. Clears the queue and its counters.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result: Vec<Diagnostic> = self.diagnostics.drain(..).collect();
        result.sort_by_key(|d| d.primary_span().map_or(u32::MAX, |span| span.start));

        if self.suppressed > 0 {
            result.push(too_many_errors(self.config.error_limit, self.suppressed));
        }

        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        result
    }
}

impl fmt::Debug for DiagnosticQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticQueue")
            .field("diagnostics", &self.diagnostics)
            .field("error_count", &self.error_count)
            .field("warning_count", &self.warning_count)
            .field("reported_errors", &self.reported_errors)
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, suppressed: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(Span::SYNTHESIZED, "error limit reached")
        .with_note(format!("{suppressed} further errors were not reported"))
}

#[cfg(test)]
mod tests;
