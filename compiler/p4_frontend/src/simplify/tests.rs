use p4_fmt::to_p4;
use p4_ir::{Ir, NodeKind};
use pretty_assertions::assert_eq;

use super::simplify;

#[test]
fn nested_blocks_and_empty_statements_flatten() {
    let mut ir = Ir::new();
    let x = ir.path("x");
    let one = ir.int(1);
    let a = ir.assign(x, one);
    let inner = ir.block(vec![a]);
    let empty = ir.empty();
    let empty_block = ir.block(vec![]);
    let y = ir.path("y");
    let two = ir.int(2);
    let b = ir.assign(y, two);
    let inner2 = ir.block(vec![b]);
    let outer = ir.block(vec![inner, empty, empty_block, inner2]);

    let out = simplify(&mut ir, outer);
    let expected = "\
{
    x = 1;
    y = 2;
}
";
    assert_eq!(to_p4(&ir, out), expected);
}

#[test]
fn blocks_with_declarations_stay_nested() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let t = ir.var("t", b8, None);
    let use_t = ir.path("t");
    let one = ir.int(1);
    let assign = ir.assign(use_t, one);
    let inner = ir.block(vec![t, assign]);
    let outer = ir.block(vec![inner]);
    assert_eq!(simplify(&mut ir, outer), outer);
}

#[test]
fn literal_conditions_select_a_branch() {
    let mut ir = Ir::new();
    let f = ir.bool_lit(false);
    let x = ir.path("x");
    let one = ir.int(1);
    let a = ir.assign(x, one);
    let dead = ir.if_stmt(f, a, None);

    let t = ir.bool_lit(true);
    let y = ir.path("y");
    let two = ir.int(2);
    let b = ir.assign(y, two);
    let then = ir.block(vec![b]);
    let exit = ir.exit();
    let live = ir.if_stmt(t, then, Some(exit));
    let outer = ir.block(vec![dead, live]);

    let out = simplify(&mut ir, outer);
    let expected = "\
{
    y = 2;
}
";
    assert_eq!(to_p4(&ir, out), expected);
}

#[test]
fn empty_ifs_go_unless_the_condition_calls() {
    let mut ir = Ir::new();
    let c = ir.path("c");
    let then = ir.block(vec![]);
    let otherwise = ir.empty();
    let pure = ir.if_stmt(c, then, Some(otherwise));
    let outer = ir.block(vec![pure]);
    let out = simplify(&mut ir, outer);
    assert_eq!(to_p4(&ir, out), "{\n}\n");

    let f = ir.path("f");
    let call = ir.call(f, vec![]);
    let then = ir.block(vec![]);
    let effectful = ir.if_stmt(call, then, None);
    let out = simplify(&mut ir, effectful);
    assert!(matches!(ir.kind(out), NodeKind::IfStatement { .. }));
}

#[test]
fn single_statement_branches_unwrap() {
    let mut ir = Ir::new();
    let c = ir.path("c");
    let x = ir.path("x");
    let one = ir.int(1);
    let a = ir.assign(x, one);
    let then = ir.block(vec![a]);
    let y = ir.path("y");
    let two = ir.int(2);
    let b = ir.assign(y, two);
    let otherwise = ir.block(vec![b]);
    let stmt = ir.if_stmt(c, then, Some(otherwise));
    let outer = ir.block(vec![stmt]);

    let out = simplify(&mut ir, outer);
    let expected = "\
{
    if (c) x = 1;
    else y = 2;
}
";
    assert_eq!(to_p4(&ir, out), expected);
    assert_eq!(simplify(&mut ir, out), out);
}

#[test]
fn unwrapping_never_creates_a_dangling_else() {
    let mut ir = Ir::new();
    let b = ir.path("b");
    let x = ir.path("x");
    let one = ir.int(1);
    let a = ir.assign(x, one);
    let inner_if = ir.if_stmt(b, a, None);
    let then = ir.block(vec![inner_if]);
    let c = ir.path("c");
    let y = ir.path("y");
    let two = ir.int(2);
    let otherwise = ir.assign(y, two);
    let outer_if = ir.if_stmt(c, then, Some(otherwise));
    assert_eq!(simplify(&mut ir, outer_if), outer_if);
}
