use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E1003)
        .with_message("duplicate declaration of `x`")
        .with_label(Span::new(10, 11), "redeclared here")
        .with_secondary_label(Span::new(2, 3), "first declared here")
        .with_note("names must be unique within a scope");

    assert!(diag.is_error());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(10, 11)));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn warnings_are_not_errors() {
    let diag = Diagnostic::warning(ErrorCode::W1001).with_message("shadowing");
    assert!(!diag.is_error());
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn display_renders_synthesized_spans() {
    let diag = internal_error(Span::SYNTHESIZED, "missing type");
    assert_eq!(
        diag.to_string(),
        "error[E9001]: internal compiler error: missing type\n  --> synthesized: while processing this node"
    );
}

#[test]
fn display_renders_notes_after_labels() {
    let diag = type_mismatch(Span::new(4, 9), "bit<8>", "bool").with_note("in assignment");
    assert_eq!(
        diag.to_string(),
        "error[E2001]: type mismatch: expected `bit<8>`, found `bool`\n  --> 4..9: expected `bit<8>`\n  = note: in assignment"
    );
}

#[test]
fn undeclared_name_uses_scoping_code() {
    let diag = undeclared_name(Span::new(0, 1), "y");
    assert_eq!(diag.code, ErrorCode::E1001);
    assert_eq!(diag.message, "`y` is not declared");
}
