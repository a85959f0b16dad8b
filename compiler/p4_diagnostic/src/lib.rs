//! Diagnostic system for the P4 frontend.
//!
//! - Error codes for searchability, grouped by class (structural, scoping,
//!   typing, semantic, internal)
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong; `synthesized` for frontend-made nodes)
//! - Notes (context)
//!
//! Passes push diagnostics into the [`DiagnosticQueue`] owned by the frontend
//! context; counters there drive stop-on-error in the pass manager.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;

pub use diagnostic::{internal_error, type_mismatch, undeclared_name, Diagnostic, Label, Severity};
pub use emitter::{DiagnosticEmitter, TextEmitter};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue, DiagnosticSink};
