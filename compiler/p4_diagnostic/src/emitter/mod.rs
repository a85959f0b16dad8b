//! Diagnostic Emitters
//!
//! Plain-text rendering of diagnostics to any [`std::io::Write`] sink.

use std::io::Write;

use crate::Diagnostic;

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// Human-readable emitter without color.
pub struct TextEmitter<W: Write> {
    writer: W,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(writer: W) -> Self {
        TextEmitter { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticEmitter for TextEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let _ = writeln!(self.writer, "{diagnostic}");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        match (error_count, warning_count) {
            (0, 0) => {}
            (e, 0) => {
                let _ = writeln!(self.writer, "{e} error{}", plural_s(e));
            }
            (0, w) => {
                let _ = writeln!(self.writer, "{w} warning{}", plural_s(w));
            }
            (e, w) => {
                let _ = writeln!(
                    self.writer,
                    "{e} error{}, {w} warning{}",
                    plural_s(e),
                    plural_s(w)
                );
            }
        }
    }
}

#[cfg(test)]
mod tests;
