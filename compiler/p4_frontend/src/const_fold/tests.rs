use p4_diagnostic::{DiagnosticConfig, DiagnosticQueue, ErrorCode};
use p4_fmt::to_p4;
use p4_ir::{BinaryOp, Ir, NodeId, NodeKind};
use p4_types::{TypeId, TypeMap};
use pretty_assertions::assert_eq;

use super::fold;
use crate::ref_map::ReferenceMap;
use crate::resolve::{resolve, ResolveOptions};

fn diagnostics() -> DiagnosticQueue {
    DiagnosticQueue::with_config(DiagnosticConfig::unlimited())
}

fn fold_resolved(ir: &mut Ir, root: NodeId, diags: &mut DiagnosticQueue) -> NodeId {
    let mut refs = ReferenceMap::new();
    resolve(ir, root, &mut refs, diags, ResolveOptions::default());
    fold(ir, root, &refs, None, diags)
}

#[test]
fn literal_arithmetic_folds() {
    let mut ir = Ir::new();
    let three = ir.int(3);
    let four = ir.int(4);
    let sum = ir.binary(BinaryOp::Add, three, four);
    let two = ir.int(2);
    let product = ir.binary(BinaryOp::Mul, sum, two);

    let mut diags = diagnostics();
    let out = fold(&mut ir, product, &ReferenceMap::new(), None, &mut diags);
    assert_eq!(to_p4(&ir, out), "14");
    assert_eq!(diags.error_count(), 0);
}

#[test]
fn constants_propagate_with_their_declared_type() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let three = ir.int(3);
    let four = ir.int(4);
    let sum = ir.binary(BinaryOp::Add, three, four);
    let k = ir.constant_decl("K", b8, sum);
    let b8 = ir.bits(8);
    let use_k = ir.path("K");
    let two = ir.int(2);
    let product = ir.binary(BinaryOp::Mul, use_k, two);
    let v = ir.constant_decl("V", b8, product);
    let root = ir.program(vec![k, v]);

    let mut diags = diagnostics();
    let out = fold_resolved(&mut ir, root, &mut diags);
    let expected = "\
const bit<8> K = 7;
const bit<8> V = 8w14;
";
    assert_eq!(to_p4(&ir, out), expected);
    assert_eq!(diags.error_count(), 0);
}

#[test]
fn errors_leave_the_expression_alone() {
    let mut ir = Ir::new();
    let four = ir.int(4);
    let zero = ir.int(0);
    let div = ir.binary(BinaryOp::Div, four, zero);
    let a = ir.bits_lit(8, 1);
    let b = ir.bits_lit(16, 1);
    let mismatch = ir.binary(BinaryOp::Add, a, b);
    let one = ir.int(1);
    let minus = ir.int(-1);
    let shift = ir.binary(BinaryOp::Shl, one, minus);
    let list = ir.list(vec![div, mismatch, shift]);

    let mut diags = diagnostics();
    let out = fold(&mut ir, list, &ReferenceMap::new(), None, &mut diags);
    assert_eq!(out, list);
    let codes: Vec<ErrorCode> = diags.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E3001, ErrorCode::E3003, ErrorCode::E3002]);
}

#[test]
fn literal_conditions_prune_branches() {
    let mut ir = Ir::new();
    let t = ir.bool_lit(true);
    let f = ir.bool_lit(false);
    let cond = ir.binary(BinaryOp::LAnd, t, f);
    let x = ir.path("x");
    let one = ir.int(1);
    let then = ir.assign(x, one);
    let dropped = ir.if_stmt(cond, then, None);

    let cond = ir.bool_lit(true);
    let y = ir.path("y");
    let two = ir.int(2);
    let kept = ir.assign(y, two);
    let other = ir.exit();
    let taken = ir.if_stmt(cond, kept, Some(other));
    let block = ir.block(vec![dropped, taken]);

    let mut diags = diagnostics();
    let out = fold(&mut ir, block, &ReferenceMap::new(), None, &mut diags);
    let expected = "\
{
    ;
    y = 2;
}
";
    assert_eq!(to_p4(&ir, out), expected);
}

#[test]
fn short_circuit_keeps_the_runtime_operand() {
    let mut ir = Ir::new();
    let t = ir.bool_lit(true);
    let x = ir.path("x");
    let and = ir.binary(BinaryOp::LAnd, t, x);
    let mut diags = diagnostics();
    let out = fold(&mut ir, and, &ReferenceMap::new(), None, &mut diags);
    assert_eq!(out, x);

    let t = ir.bool_lit(true);
    let y = ir.path("y");
    let or = ir.binary(BinaryOp::LOr, t, y);
    let out = fold(&mut ir, or, &ReferenceMap::new(), None, &mut diags);
    assert!(matches!(ir.kind(out), NodeKind::BoolLiteral { value: true }));
}

#[test]
fn typed_mode_takes_result_types_from_the_map() {
    let mut ir = Ir::new();
    let target = ir.type_name("Nibble");
    let five = ir.int(5);
    let cast = ir.cast(target, five);

    let mut types = TypeMap::new();
    let nibble = types.pool_mut().bits(4, false);
    types.set_type(cast, nibble);
    types.set_type(five, TypeId::INF_INT);

    let mut diags = diagnostics();
    let out = fold(&mut ir, cast, &ReferenceMap::new(), Some(&mut types), &mut diags);
    assert_eq!(to_p4(&ir, out), "4w5");
    assert_eq!(types.get_type(out), Some(nibble));
    assert!(types.is_compile_time_constant(out));
}

#[test]
fn typed_mode_without_a_type_is_an_internal_error() {
    let mut ir = Ir::new();
    let one = ir.int(1);
    let two = ir.int(2);
    let sum = ir.binary(BinaryOp::Add, one, two);
    let mut types = TypeMap::new();
    let mut diags = diagnostics();
    let out = fold(&mut ir, sum, &ReferenceMap::new(), Some(&mut types), &mut diags);
    assert_eq!(out, sum);
    let codes: Vec<ErrorCode> = diags.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E9001]);
}

#[test]
fn folding_is_idempotent() {
    let mut ir = Ir::new();
    let a = ir.bits_lit(8, 200);
    let b = ir.bits_lit(8, 100);
    let sum = ir.binary(BinaryOp::Add, a, b);
    let x = ir.path("x");
    let mixed = ir.binary(BinaryOp::Mul, x, sum);
    let mut diags = diagnostics();
    let once = fold(&mut ir, mixed, &ReferenceMap::new(), None, &mut diags);
    assert_eq!(to_p4(&ir, once), "x * 8w44");
    let twice = fold(&mut ir, once, &ReferenceMap::new(), None, &mut diags);
    assert_eq!(twice, once);
}
