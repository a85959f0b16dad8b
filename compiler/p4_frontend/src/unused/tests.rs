use p4_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use p4_ir::{Direction, Ir, NodeId, NodeKind};
use pretty_assertions::assert_eq;

use super::remove_unused;
use crate::ref_map::ReferenceMap;
use crate::resolve::{resolve, ResolveOptions};

fn run(ir: &mut Ir, root: NodeId) -> NodeId {
    let mut refs = ReferenceMap::new();
    let mut diags = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    resolve(ir, root, &mut refs, &mut diags, ResolveOptions::default());
    assert_eq!(diags.error_count(), 0);
    remove_unused(ir, root, &refs)
}

fn names(ir: &Ir, list: &[NodeId]) -> Vec<&'static str> {
    list.iter().map(|&d| ir.decl_name_str(d)).collect()
}

fn top_level(ir: &Ir, root: NodeId) -> Vec<NodeId> {
    match ir.kind(root) {
        NodeKind::Program { decls } => decls.clone(),
        other => panic!("not a program: {}", other.tag()),
    }
}

#[test]
fn actions_named_by_tables_survive() {
    let mut ir = Ir::new();
    let body = ir.block(vec![]);
    let used = ir.action("used", vec![], body);
    let body = ir.block(vec![]);
    let unused = ir.action("unused", vec![], body);
    let callee = ir.path("used");
    let entry = ir.call(callee, vec![]);
    let actions = ir.action_list(vec![entry]);
    let actions = ir.property("actions", actions);
    let table = ir.table("t", vec![], vec![actions]);
    let apply = ir.apply_call("t", vec![]);
    let stmt = ir.call_stmt(apply);
    let body = ir.block(vec![stmt]);
    let control = ir.control("C", vec![], vec![], vec![used, unused, table], body);
    let root = ir.program(vec![control]);

    let out = run(&mut ir, root);
    let decls = top_level(&ir, out);
    let NodeKind::Control { locals, .. } = ir.kind(decls[0]) else {
        panic!("expected a control");
    };
    assert_eq!(names(&ir, locals), vec!["used", "t"]);
}

#[test]
fn main_decides_what_is_reachable() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let f = ir.field("f", b8);
    let header = ir.header_decl("H", vec![f]);
    let b8 = ir.bits(8);
    let g = ir.field("g", b8);
    let spare_struct = ir.struct_decl("S", vec![g]);

    let h_ty = ir.type_name("H");
    let h = ir.param(Direction::InOut, "h", h_ty);
    let prototype = ir.control_type("Ctl", vec![], vec![h]);
    let ctl_ty = ir.type_name("Ctl");
    let c = ir.param(Direction::None, "c", ctl_ty);
    let package = ir.package_decl("Switch", vec![], vec![c]);

    let h_ty = ir.type_name("H");
    let h = ir.param(Direction::InOut, "h", h_ty);
    let body = ir.block(vec![]);
    let ingress = ir.control("Ingress", vec![], vec![h], vec![], body);
    let body = ir.block(vec![]);
    let spare = ir.control("Spare", vec![], vec![], vec![], body);

    let switch = ir.type_name("Switch");
    let ctor = ir.path("Ingress");
    let arg = ir.call(ctor, vec![]);
    let main = ir.instance("main", switch, vec![arg]);
    let root = ir.program(vec![header, spare_struct, prototype, package, ingress, spare, main]);

    let out = run(&mut ir, root);
    let decls = top_level(&ir, out);
    assert_eq!(names(&ir, &decls), vec!["H", "Ctl", "Switch", "Ingress", "main"]);
}

#[test]
fn fixed_parser_states_are_kept() {
    let mut ir = Ir::new();
    let start = ir.state("start", vec![], Some("accept"));
    let accept = ir.state("accept", vec![], None);
    let reject = ir.state("reject", vec![], None);
    let orphan = ir.state("orphan", vec![], Some("reject"));
    let parser = ir.parser("P", vec![], vec![], vec![], vec![start, accept, reject, orphan]);
    let root = ir.program(vec![parser]);

    let out = run(&mut ir, root);
    let decls = top_level(&ir, out);
    let NodeKind::Parser { states, .. } = ir.kind(decls[0]) else {
        panic!("expected a parser");
    };
    assert_eq!(names(&ir, states), vec!["start", "accept", "reject"]);
}

#[test]
fn variables_with_side_effects_are_kept() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let one = ir.int(1);
    let ret = ir.ret(Some(one));
    let body = ir.block(vec![ret]);
    let f = ir.function("f", vec![], vec![], b8, body);

    let b8 = ir.bits(8);
    let callee = ir.path("f");
    let call = ir.call(callee, vec![]);
    let effectful = ir.var("v", b8, Some(call));
    let b8 = ir.bits(8);
    let two = ir.int(2);
    let pure = ir.var("w", b8, Some(two));
    let body = ir.block(vec![effectful, pure]);
    let control = ir.control("C", vec![], vec![], vec![], body);
    let root = ir.program(vec![f, control]);

    let out = run(&mut ir, root);
    let decls = top_level(&ir, out);
    let NodeKind::Control { body, .. } = ir.kind(decls[1]) else {
        panic!("expected a control");
    };
    let NodeKind::BlockStatement { components } = ir.kind(*body) else {
        panic!("expected a block");
    };
    assert_eq!(names(&ir, components), vec!["v"]);
}

#[test]
fn removal_is_idempotent() {
    let mut ir = Ir::new();
    let body = ir.block(vec![]);
    let unused = ir.action("unused", vec![], body);
    let body = ir.block(vec![]);
    let control = ir.control("C", vec![], vec![], vec![unused], body);
    let root = ir.program(vec![control]);

    let once = run(&mut ir, root);
    assert_ne!(once, root);
    assert_eq!(run(&mut ir, once), once);
}
