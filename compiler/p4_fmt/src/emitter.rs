//! Output Emitter
//!
//! Abstraction for output production during printing. The string emitter
//! serves tests and checkpoints; the writer emitter streams to any
//! [`std::io::Write`] sink.

use std::io::Write;

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Trait for emitting printed output.
pub trait Emitter {
    /// Emit a text fragment.
    fn emit(&mut self, text: &str);

    /// Emit a newline (Unix-style `\n`).
    fn emit_newline(&mut self) {
        self.emit("\n");
    }

    /// Emit indentation ([`INDENT_WIDTH`] spaces per level).
    fn emit_indent(&mut self, level: usize) {
        if level > 0 {
            self.emit(&" ".repeat(level * INDENT_WIDTH));
        }
    }
}

/// String-based emitter for in-memory printing.
#[derive(Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the printed output.
    pub fn output(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Emitter for StringEmitter {
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Emitter streaming into an [`std::io::Write`] sink.
///
/// Write errors are remembered rather than reported per call; check
/// [`WriterEmitter::finish`] once printing is done.
pub struct WriterEmitter<W: Write> {
    writer: W,
    error: Option<std::io::Error>,
}

impl<W: Write> WriterEmitter<W> {
    pub fn new(writer: W) -> Self {
        WriterEmitter {
            writer,
            error: None,
        }
    }

    /// Flush the sink and report the first write error, if any.
    pub fn finish(mut self) -> std::io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()
    }
}

impl<W: Write> Emitter for WriterEmitter<W> {
    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.writer.write_all(text.as_bytes()) {
            self.error = Some(error);
        }
    }
}
