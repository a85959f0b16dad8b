use p4_diagnostic::{DiagnosticConfig, DiagnosticQueue, ErrorCode};
use p4_ir::{Direction, Ir, NodeId};
use pretty_assertions::assert_eq;

use super::*;

fn run(ir: &Ir, root: NodeId, options: ResolveOptions) -> (ReferenceMap, Vec<ErrorCode>) {
    let mut refs = ReferenceMap::new();
    let mut diags = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    resolve(ir, root, &mut refs, &mut diags, options);
    let codes = diags.flush().into_iter().map(|d| d.code).collect();
    (refs, codes)
}

#[test]
fn uses_bind_to_the_nearest_declaration() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let one = ir.int(1);
    let outer = ir.constant_decl("x", ty, one);

    let pty = ir.bits(8);
    let param = ir.param(Direction::InOut, "x", pty);
    let lhs = ir.path("x");
    let rhs = ir.absolute_path("x");
    let assign = ir.assign(lhs, rhs);
    let body = ir.block(vec![assign]);
    let control = ir.control("C", vec![], vec![param], vec![], body);
    let root = ir.program(vec![outer, control]);

    let (refs, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![]);
    assert_eq!(refs.get_declaration(lhs), Some(param));
    assert_eq!(refs.get_declaration(rhs), Some(outer));
    assert!(refs.is_reachable(lhs));
}

#[test]
fn use_before_declaration_depends_on_forward_refs() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let b = ir.path("b");
    let a = ir.constant_decl("a", ty, b);
    let ty2 = ir.bits(8);
    let two = ir.int(2);
    let b_decl = ir.constant_decl("b", ty2, two);
    let root = ir.program(vec![a, b_decl]);

    let (refs, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![ErrorCode::E1002]);
    assert_eq!(refs.get_declaration(b), None);

    let options = ResolveOptions {
        forward_refs: true,
        ..ResolveOptions::default()
    };
    let (refs, codes) = run(&ir, root, options);
    assert_eq!(codes, vec![]);
    assert_eq!(refs.get_declaration(b), Some(b_decl));
}

#[test]
fn parser_states_may_be_referenced_early() {
    let mut ir = Ir::new();
    let start = ir.state("start", vec![], Some("next"));
    let next = ir.state("next", vec![], Some("start"));
    let parser = ir.parser("P", vec![], vec![], vec![], vec![start, next]);
    let root = ir.program(vec![parser]);

    let (refs, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![]);
    assert_eq!(refs.reference_count(), 2);
}

#[test]
fn undeclared_and_duplicate_names() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let one = ir.int(1);
    let first = ir.constant_decl("a", ty, one);
    let ty2 = ir.bits(8);
    let missing = ir.path("nowhere");
    let second = ir.constant_decl("a", ty2, missing);
    let root = ir.program(vec![first, second]);

    let (_, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![ErrorCode::E1003, ErrorCode::E1001]);
}

#[test]
fn extern_methods_overload() {
    let mut ir = Ir::new();
    let v1 = ir.void_type();
    let m1 = ir.method("read", vec![], vec![], v1);
    let t = ir.bits(8);
    let p = ir.param(Direction::Out, "r", t);
    let v2 = ir.void_type();
    let m2 = ir.method("read", vec![], vec![p], v2);
    let ext = ir.extern_decl("Reg", vec![], vec![m1, m2]);
    let root = ir.program(vec![ext]);

    let (_, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![]);
}

#[test]
fn enum_members_resolve_through_the_enum() {
    let mut ir = Ir::new();
    let e = ir.enum_decl("E", &["A", "B"]);
    let prefix = ir.path("E");
    let good = ir.member(prefix, "A");
    let prefix2 = ir.path("E");
    let bad = ir.member(prefix2, "C");
    let t1 = ir.type_name("E");
    let c1 = ir.constant_decl("x", t1, good);
    let t2 = ir.type_name("E");
    let c2 = ir.constant_decl("y", t2, bad);
    let root = ir.program(vec![e, c1, c2]);

    let (refs, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![ErrorCode::E1004]);
    let NodeKind::TypeEnum { members, .. } = ir.kind(e) else {
        panic!("not an enum");
    };
    assert_eq!(refs.get_declaration(good), Some(members[0]));
    assert_eq!(refs.get_declaration(prefix), Some(e));
}

#[test]
fn type_names_must_name_types() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let one = ir.int(1);
    let k = ir.constant_decl("k", ty, one);
    let bad = ir.type_name("k");
    let zero = ir.int(0);
    let v = ir.constant_decl("v", bad, zero);
    let root = ir.program(vec![k, v]);

    let (_, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![ErrorCode::E1006]);
}

#[test]
fn typedef_cycles_are_reported() {
    let mut ir = Ir::new();
    let to_b = ir.type_name("B");
    let a = ir.typedef("A", to_b);
    let to_a = ir.type_name("A");
    let b = ir.typedef("B", to_a);
    let root = ir.program(vec![a, b]);

    let options = ResolveOptions {
        forward_refs: true,
        ..ResolveOptions::default()
    };
    let (_, codes) = run(&ir, root, options);
    assert_eq!(codes, vec![ErrorCode::E1005]);
}

#[test]
fn shadowing_a_different_kind_warns_when_enabled() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let one = ir.int(1);
    let k = ir.constant_decl("x", ty, one);
    let pty = ir.bits(8);
    let param = ir.param(Direction::In, "x", pty);
    let body = ir.block(vec![]);
    let action = ir.action("a", vec![param], body);
    let root = ir.program(vec![k, action]);

    let (_, codes) = run(&ir, root, ResolveOptions::default());
    assert_eq!(codes, vec![]);

    let options = ResolveOptions {
        check_shadowing: true,
        ..ResolveOptions::default()
    };
    let (_, codes) = run(&ir, root, options);
    assert_eq!(codes, vec![ErrorCode::W1001]);
}

#[test]
fn resolving_again_starts_from_scratch() {
    let mut ir = Ir::new();
    let ty = ir.bits(8);
    let one = ir.int(1);
    let k = ir.constant_decl("k", ty, one);
    let use_k = ir.path("k");
    let ty2 = ir.bits(8);
    let v = ir.constant_decl("v", ty2, use_k);
    let root = ir.program(vec![k, v]);

    let mut refs = ReferenceMap::new();
    let mut diags = DiagnosticQueue::new();
    resolve(&ir, root, &mut refs, &mut diags, ResolveOptions::default());
    let scopes = refs.scope_count();
    resolve(&ir, root, &mut refs, &mut diags, ResolveOptions::default());
    assert_eq!(refs.scope_count(), scopes);
    assert_eq!(refs.reference_count(), 1);
    assert_eq!(diags.error_count(), 0);
}
