use p4_fmt::to_p4;
use p4_ir::{Direction, Ir, NodeKind};
use pretty_assertions::assert_eq;

use super::create_builtins;

#[test]
fn empty_program_gets_no_action_and_match_kinds() {
    let mut ir = Ir::new();
    let root = ir.program(vec![]);
    let out = create_builtins(&mut ir, root);
    let expected = "\
action NoAction() {
}
match_kind { exact, ternary, lpm }
";
    assert_eq!(to_p4(&ir, out), expected);

    // Nothing left to add.
    assert_eq!(create_builtins(&mut ir, out), out);
}

#[test]
fn only_missing_match_kinds_are_added() {
    let mut ir = Ir::new();
    let mk = ir.match_kind(&["exact", "range"]);
    let body = ir.block(vec![]);
    let no_action = ir.action("NoAction", vec![], body);
    let root = ir.program(vec![mk, no_action]);
    let out = create_builtins(&mut ir, root);
    let expected = "\
match_kind { ternary, lpm }
match_kind { exact, range }
action NoAction() {
}
";
    assert_eq!(to_p4(&ir, out), expected);
}

#[test]
fn parsers_get_accept_and_reject() {
    let mut ir = Ir::new();
    let start = ir.state("start", vec![], Some("accept"));
    let parser = ir.parser("p", vec![], vec![], vec![], vec![start]);
    let root = ir.program(vec![parser]);
    let out = create_builtins(&mut ir, root);

    let NodeKind::Program { decls } = ir.kind(out) else {
        panic!("not a program");
    };
    let NodeKind::Parser { states, .. } = ir.kind(decls[2]) else {
        panic!("not a parser");
    };
    let names: Vec<&str> = states.iter().map(|&s| ir.decl_name_str(s)).collect();
    assert_eq!(names, vec!["start", "accept", "reject"]);
}

#[test]
fn tables_get_a_default_action() {
    let mut ir = Ir::new();
    let set = ir.path("set");
    let list = ir.action_list(vec![set]);
    let actions = ir.property("actions", list);
    let table = ir.table("t", vec![], vec![actions]);
    let bare = ir.table("u", vec![], vec![]);
    let body = ir.block(vec![]);
    let control = ir.control("c", vec![], vec![], vec![table, bare], body);
    let out = create_builtins(&mut ir, control);

    let expected = "\
control c() {
    table t {
        actions = {
            set();
            NoAction();
        }
        default_action = NoAction();
    }
    table u {
        actions = {
            NoAction();
        }
        default_action = NoAction();
    }
    apply {
    }
}
";
    assert_eq!(to_p4(&ir, out), expected);
}

#[test]
fn omitted_arguments_take_parameter_defaults() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let x = ir.param(Direction::In, "x", b8);
    let b8 = ir.bits(8);
    let seven = ir.int(7);
    let y = ir.param_with_default(Direction::In, "y", b8, seven);
    let body = ir.block(vec![]);
    let f = ir.action("a", vec![x, y], body);

    let callee = ir.path("a");
    let one = ir.int(1);
    let call = ir.call(callee, vec![one]);
    let stmt = ir.call_stmt(call);
    let apply = ir.block(vec![stmt]);
    let control = ir.control("c", vec![], vec![], vec![], apply);

    let ctl_ty = ir.type_name("c");
    let default_ctl = ir.instance("c_inst", ctl_ty, vec![]);
    let pty = ir.type_name("c");
    let ctor_default = ir.path("c_inst");
    let pkg_param = ir.param_with_default(Direction::None, "ig", pty, ctor_default);
    let pkg = ir.package_decl("Top", vec![], vec![pkg_param]);
    let top = ir.type_name("Top");
    let main = ir.instance("main", top, vec![]);

    let root = ir.program(vec![f, control, default_ctl, pkg, main]);
    let out = create_builtins(&mut ir, root);
    let printed = to_p4(&ir, out);
    assert!(printed.contains("a(1, 7);"), "{printed}");
    assert!(printed.contains("Top(c_inst) main;"), "{printed}");
}
