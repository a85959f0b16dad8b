//! P4 Printer
//!
//! Prints frontend IR back to P4 source text. Used for the `ToP4`
//! checkpoints of the frontend pipeline and for golden-output tests.
//!
//! # Modules
//!
//! - [`emitter`]: Output abstraction for string and writer output
//! - [`printer`]: The printer proper

pub mod emitter;
pub mod printer;

use std::io::Write;

use p4_ir::{Ir, NodeId};

pub use emitter::{Emitter, StringEmitter, WriterEmitter, INDENT_WIDTH};
pub use printer::Printer;

/// Print the subtree rooted at `root` as P4 source.
pub fn to_p4(ir: &Ir, root: NodeId) -> String {
    let mut printer = Printer::new(ir, StringEmitter::new());
    printer.print(root);
    printer.into_emitter().output()
}

/// Print the subtree rooted at `root` into `writer`.
pub fn write_p4<W: Write>(ir: &Ir, root: NodeId, writer: W) -> std::io::Result<()> {
    let mut printer = Printer::new(ir, WriterEmitter::new(writer));
    printer.print(root);
    printer.into_emitter().finish()
}
