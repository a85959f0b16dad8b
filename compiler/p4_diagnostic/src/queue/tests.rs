use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;

fn error_at(start: u32, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(message)
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn counts_errors_and_warnings_separately() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.push(error_at(0, "first")));
    assert!(queue.push(Diagnostic::warning(ErrorCode::W1001).with_message("shadow")));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.has_errors());
}

#[test]
fn identical_diagnostics_are_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.push(error_at(3, "same")));
    assert!(!queue.push(error_at(3, "same")));
    assert!(queue.push(error_at(4, "same")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn unlimited_config_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    assert!(queue.push(error_at(3, "same")));
    assert!(queue.push(error_at(3, "same")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn error_limit_suppresses_and_reports() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for i in 0..5 {
        queue.push(error_at(i, "boom"));
    }
    assert!(queue.limit_reached());
    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.suppressed_count(), 3);

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 3);
    assert_eq!(flushed[2].code, ErrorCode::E9002);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn flush_sorts_by_position_with_synthesized_last() {
    let mut queue = DiagnosticQueue::new();
    queue.push(
        Diagnostic::error(ErrorCode::E9001)
            .with_message("synth")
            .with_label(Span::SYNTHESIZED, "here"),
    );
    queue.push(error_at(20, "late"));
    queue.push(error_at(5, "early"));

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["early", "late", "synth"]);
}

#[test]
fn sink_observes_accepted_diagnostics() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&seen);
    let mut queue = DiagnosticQueue::new().with_sink(move |d| {
        recorder.borrow_mut().push(d.code);
    });

    queue.push(error_at(0, "a"));
    queue.push(error_at(0, "a"));
    queue.push(Diagnostic::warning(ErrorCode::W1001).with_message("w"));

    assert_eq!(*seen.borrow(), vec![ErrorCode::E2001, ErrorCode::W1001]);
}

#[test]
fn reported_errors_count_dropped_ones_too() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: true,
    });
    queue.push(error_at(0, "a"));
    queue.push(error_at(0, "a"));
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.reported_errors(), 2);

    queue.push(error_at(1, "b"));
    queue.push(error_at(2, "c"));
    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.suppressed_count(), 1);
    assert_eq!(queue.reported_errors(), 4);

    queue.push(Diagnostic::warning(ErrorCode::W1001).with_message("w"));
    assert_eq!(queue.reported_errors(), 4);

    queue.flush();
    assert_eq!(queue.error_count(), 0);
    assert_eq!(queue.reported_errors(), 4);
}
