#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use p4_ir::Span;
use pretty_assertions::assert_eq;

use super::*;
use crate::ErrorCode;

#[test]
fn emits_one_block_per_diagnostic() {
    let mut emitter = TextEmitter::new(Vec::new());
    emitter.emit_all(&[
        Diagnostic::error(ErrorCode::E1001)
            .with_message("`x` is not declared")
            .with_label(Span::new(3, 4), "not found in this scope"),
        Diagnostic::warning(ErrorCode::W1001).with_message("shadowing"),
    ]);
    emitter.emit_summary(1, 1);
    emitter.flush();

    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(
        text,
        "error[E1001]: `x` is not declared\n  --> 3..4: not found in this scope\n\
         warning[W1001]: shadowing\n\
         1 error, 1 warning\n"
    );
}

#[test]
fn summary_pluralizes() {
    let mut emitter = TextEmitter::new(Vec::new());
    emitter.emit_summary(2, 0);
    emitter.emit_summary(0, 0);
    emitter.emit_summary(0, 3);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text, "2 errors\n3 warnings\n");
}
