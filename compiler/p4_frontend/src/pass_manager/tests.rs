#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use p4_diagnostic::{Diagnostic, ErrorCode};
use p4_ir::{Ir, NodeId, NodeKind};
use pretty_assertions::assert_eq;

use super::*;
use crate::context::FrontendContext;

/// Rebuilds the program root until it has been rebuilt `remaining` times.
struct Rebuild {
    remaining: usize,
}

impl Pass for Rebuild {
    fn name(&self) -> &str {
        "Rebuild"
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        if self.remaining == 0 {
            return Ok(root);
        }
        self.remaining -= 1;
        let kind = ctx.ir.kind(root).clone();
        Ok(ctx.ir.replace_kind(root, kind))
    }
}

/// Reports one error per run.
struct Complain;

impl Pass for Complain {
    fn name(&self) -> &str {
        "Complain"
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let count = ctx.error_count();
        ctx.report(Diagnostic::error(ErrorCode::E2001).with_message(format!("complaint {count}")));
        Ok(root)
    }
}

/// Reports the same error every run.
struct Repeat;

impl Pass for Repeat {
    fn name(&self) -> &str {
        "Repeat"
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        ctx.report(Diagnostic::error(ErrorCode::E2001).with_message("again"));
        Ok(root)
    }
}

/// Needs the reference map.
struct Reader {
    runs: usize,
}

impl Pass for Reader {
    fn name(&self) -> &str {
        "Reader"
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, _ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        self.runs += 1;
        Ok(root)
    }
}

/// Pretends to populate the reference map.
struct Populate;

impl Pass for Populate {
    fn name(&self) -> &str {
        "Populate"
    }

    fn populates(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, _ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(root)
    }
}

fn context() -> (FrontendContext, NodeId) {
    let mut ir = Ir::new();
    let root = ir.program(vec![]);
    (FrontendContext::new(ir), root)
}

#[test]
fn sequence_threads_the_root() {
    let (mut ctx, root) = context();
    let mut pm = PassManager::new("seq")
        .with(Rebuild { remaining: 1 })
        .with(Rebuild { remaining: 1 });
    let out = apply_pass(&mut pm, &mut ctx, root).unwrap();
    assert_ne!(out, root);
    assert!(matches!(ctx.ir.kind(out), NodeKind::Program { .. }));
    assert_eq!(ctx.ir.len(), 3);
}

#[test]
fn stop_on_error_skips_later_passes() {
    let (mut ctx, root) = context();
    let mut pm = PassManager::new("seq")
        .with(Complain)
        .with(Rebuild { remaining: 1 });
    pm.set_stop_on_error(true);
    let out = apply_pass(&mut pm, &mut ctx, root).unwrap();
    assert_eq!(out, root);
    assert_eq!(ctx.error_count(), 1);

    let (mut ctx, root) = context();
    let mut pm = PassManager::new("seq")
        .with(Complain)
        .with(Rebuild { remaining: 1 });
    let out = apply_pass(&mut pm, &mut ctx, root).unwrap();
    assert_ne!(out, root);
}

#[test]
fn stop_on_error_sees_deduplicated_errors() {
    let (mut ctx, root) = context();
    ctx.report(Diagnostic::error(ErrorCode::E2001).with_message("again"));
    let mut pm = PassManager::new("seq")
        .with(Repeat)
        .with(Rebuild { remaining: 1 });
    pm.set_stop_on_error(true);
    let out = apply_pass(&mut pm, &mut ctx, root).unwrap();
    assert_eq!(out, root);
    assert_eq!(ctx.error_count(), 1);
    assert_eq!(ctx.reported_errors(), 2);

    let (mut ctx, root) = context();
    let mut rep = PassRepeated::new("loop")
        .with(Repeat)
        .with(Rebuild { remaining: 1 });
    rep.set_stop_on_error(true);
    ctx.report(Diagnostic::error(ErrorCode::E2001).with_message("again"));
    assert_eq!(apply_pass(&mut rep, &mut ctx, root).unwrap(), root);
}

#[test]
fn repeated_runs_until_nothing_changes() {
    let (mut ctx, root) = context();
    let mut rep = PassRepeated::new("loop").with(Rebuild { remaining: 3 });
    let out = apply_pass(&mut rep, &mut ctx, root).unwrap();
    assert_ne!(out, root);
    // Three changing iterations plus the one that detects the fixpoint.
    assert_eq!(ctx.ir.len(), 4);
}

#[test]
fn repeated_reports_the_last_mutating_pass_at_the_cap() {
    let (mut ctx, root) = context();
    let mut rep = PassRepeated::new("loop")
        .with(Rebuild { remaining: 10 })
        .with_max_iterations(3);
    let err = apply_pass(&mut rep, &mut ctx, root).unwrap_err();
    match err {
        PassError::IterationLimit {
            pass,
            limit,
            last_changed,
        } => {
            assert_eq!(pass, "loop");
            assert_eq!(limit, 3);
            assert_eq!(last_changed, "Rebuild");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn new_errors_prevent_the_fixpoint() {
    let (mut ctx, root) = context();
    let mut rep = PassRepeated::new("loop")
        .with(Complain)
        .with_max_iterations(2);
    assert!(apply_pass(&mut rep, &mut ctx, root).is_err());

    let (mut ctx, root) = context();
    let mut rep = PassRepeated::new("loop").with(Complain);
    rep.set_stop_on_error(true);
    assert_eq!(apply_pass(&mut rep, &mut ctx, root).unwrap(), root);
    assert_eq!(ctx.error_count(), 1);
}

#[test]
fn stale_reads_are_fatal() {
    let (mut ctx, root) = context();
    let mut reader = Reader { runs: 0 };
    let err = apply_pass(&mut reader, &mut ctx, root).unwrap_err();
    assert!(matches!(
        err,
        PassError::StaleAnalysis { analyses, .. } if analyses == Analyses::REFERENCES
    ));

    let mut pm = PassManager::new("seq")
        .with(Populate)
        .with(Reader { runs: 0 });
    assert!(apply_pass(&mut pm, &mut ctx, root).is_ok());

    // A changing pass invalidates; the next reader fails.
    let mut pm = PassManager::new("seq")
        .with(Rebuild { remaining: 1 })
        .with(Reader { runs: 0 });
    assert!(matches!(
        apply_pass(&mut pm, &mut ctx, root),
        Err(PassError::StaleAnalysis { .. })
    ));
}

#[test]
fn unchanged_root_keeps_analyses_fresh() {
    let (mut ctx, root) = context();
    apply_pass(&mut Populate, &mut ctx, root).unwrap();
    apply_pass(&mut Rebuild { remaining: 0 }, &mut ctx, root).unwrap();
    assert!(!ctx.stale().contains(Analyses::REFERENCES));
}
