#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use p4_ir::{BigInt, BinaryOp, Direction, IntType, Ir, UnaryOp};
use pretty_assertions::assert_eq;

use crate::to_p4;

use super::expr::constant_text;

#[test]
fn constants_print_width_and_sign() {
    assert_eq!(constant_text(&BigInt::from(42), IntType::Infinite, 10), "42");
    assert_eq!(constant_text(&BigInt::from(7), IntType::bits(8), 10), "8w7");
    assert_eq!(constant_text(&BigInt::from(-5), IntType::signed(8), 10), "-8s5");
    assert_eq!(constant_text(&BigInt::from(31), IntType::bits(16), 16), "16w0x1f");
}

#[test]
fn binary_parenthesizes_by_precedence() {
    let mut ir = Ir::new();
    let a = ir.path("a");
    let b = ir.path("b");
    let c = ir.path("c");
    let sum = ir.binary(BinaryOp::Add, a, b);
    let product = ir.binary(BinaryOp::Mul, sum, c);
    assert_eq!(to_p4(&ir, product), "(a + b) * c");

    let a = ir.path("a");
    let b = ir.path("b");
    let c = ir.path("c");
    let product = ir.binary(BinaryOp::Mul, b, c);
    let sum = ir.binary(BinaryOp::Add, a, product);
    assert_eq!(to_p4(&ir, sum), "a + b * c");

    // Left-associative: a right operand of equal precedence keeps its parens.
    let a = ir.path("a");
    let b = ir.path("b");
    let c = ir.path("c");
    let diff = ir.binary(BinaryOp::Sub, b, c);
    let outer = ir.binary(BinaryOp::Sub, a, diff);
    assert_eq!(to_p4(&ir, outer), "a - (b - c)");
}

#[test]
fn prefix_and_postfix_forms() {
    let mut ir = Ir::new();
    let x = ir.path("x");
    let neg = ir.unary(UnaryOp::Neg, x);
    let ty = ir.bits(8);
    let cast = ir.cast(ty, neg);
    assert_eq!(to_p4(&ir, cast), "(bit<8>)-x");

    let h = ir.path("h");
    let field = ir.member(h, "f");
    let slice = ir.slice(field, 7, 4);
    assert_eq!(to_p4(&ir, slice), "h.f[7:4]");

    let cond = ir.path("c");
    let one = ir.int(1);
    let two = ir.int(2);
    let mux = ir.mux(cond, one, two);
    let ty = ir.bits(4);
    let cast = ir.cast(ty, mux);
    assert_eq!(to_p4(&ir, cast), "(bit<4>)(c ? 1 : 2)");

    let t = ir.path("t");
    let member = ir.member(t, "hit");
    let not = ir.unary(UnaryOp::LNot, member);
    assert_eq!(to_p4(&ir, not), "!t.hit");
}

#[test]
fn calls_lists_and_paths() {
    let mut ir = Ir::new();
    let method = ir.path("f");
    let targ = ir.bits(8);
    let arg = ir.absolute_path("x");
    let s = ir.string_lit("hi");
    let call = ir.call_generic(method, vec![targ], vec![arg, s]);
    assert_eq!(to_p4(&ir, call), "f<bit<8>>(.x, \"hi\")");

    let a = ir.bool_lit(true);
    let b = ir.int(3);
    let list = ir.list(vec![a, b]);
    assert_eq!(to_p4(&ir, list), "{true, 3}");

    let apply = ir.apply_call("t", vec![]);
    assert_eq!(to_p4(&ir, apply), "t.apply()");
}

#[test]
fn type_declarations() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let f = ir.field("a", b8);
    let s = ir.struct_decl("S", vec![f]);
    let b16 = ir.bits(16);
    let f = ir.field("ether_type", b16);
    let h = ir.header_decl("H", vec![f]);
    let e = ir.enum_decl("E", &["A", "B"]);
    let mk = ir.match_kind(&["exact", "ternary"]);
    let i4 = ir.signed_bits(4);
    let td = ir.typedef("N", i4);
    let program = ir.program(vec![s, h, e, mk, td]);

    let expected = "\
struct S {
    bit<8> a;
}
header H {
    bit<16> ether_type;
}
enum E { A, B }
match_kind { exact, ternary }
typedef int<4> N;
";
    assert_eq!(to_p4(&ir, program), expected);
}

#[test]
fn extern_and_prototypes() {
    let mut ir = Ir::new();
    let t = ir.type_var("T");
    let void = ir.void_type();
    let ctor = ir.method("Register", vec![], vec![], void);
    let elem = ir.type_name("T");
    let b32 = ir.bits(32);
    let index = ir.param(Direction::In, "index", b32);
    let out = ir.param(Direction::Out, "result", elem);
    let void = ir.void_type();
    let read = ir.method("read", vec![], vec![index, out], void);
    let ext = ir.extern_decl("Register", vec![t], vec![ctor, read]);

    let h = ir.type_var("H");
    let hty = ir.type_name("H");
    let hp = ir.param(Direction::InOut, "h", hty);
    let ctl = ir.control_type("Ingress", vec![h], vec![hp]);

    let h = ir.type_var("H");
    let harg = ir.type_name("H");
    let ingress = ir.specialized("Ingress", vec![harg]);
    let ip = ir.param(Direction::None, "ig", ingress);
    let pkg = ir.package_decl("Switch", vec![h], vec![ip]);

    let program = ir.program(vec![ext, ctl, pkg]);
    let expected = "\
extern Register<T> {
    Register();
    void read(in bit<32> index, out T result);
}
control Ingress<H>(inout H h);
package Switch<H>(Ingress<H> ig);
";
    assert_eq!(to_p4(&ir, program), expected);
}

#[test]
fn control_with_table_and_statements() {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let hp = ir.param(Direction::InOut, "x", b8);

    let b8 = ir.bits(8);
    let v = ir.param(Direction::None, "v", b8);
    let lhs = ir.path("x");
    let rhs = ir.path("v");
    let set = ir.assign(lhs, rhs);
    let body = ir.block(vec![set]);
    let act = ir.action("set", vec![v], body);

    let key_expr = ir.path("x");
    let ke = ir.key_element(key_expr, "exact");
    let key = ir.key(vec![ke]);
    let key = ir.property("key", key);
    let set_ref = ir.path("set");
    let no_action = ir.path("NoAction");
    let list = ir.action_list(vec![set_ref, no_action]);
    let actions = ir.property("actions", list);
    let callee = ir.path("NoAction");
    let default_call = ir.call(callee, vec![]);
    let default_value = ir.expression_value(default_call);
    let default_action = ir.property("default_action", default_value);
    let table = ir.table("t", vec![], vec![key, actions, default_action]);

    let b8 = ir.bits(8);
    let zero = ir.bits_lit(8, 0);
    let tmp = ir.var("tmp", b8, Some(zero));
    let apply = ir.apply_call("t", vec![]);
    let apply = ir.call_stmt(apply);
    let x = ir.path("x");
    let limit = ir.int(10);
    let cond = ir.binary(BinaryOp::Grt, x, limit);
    let exit = ir.exit();
    let then = ir.block(vec![exit]);
    let ret = ir.ret(None);
    let otherwise = ir.block(vec![ret]);
    let branch = ir.if_stmt(cond, then, Some(otherwise));
    let body = ir.block(vec![tmp, apply, branch]);

    let ctl = ir.control("c", vec![], vec![hp], vec![act, table], body);
    let expected = "\
control c(inout bit<8> x) {
    action set(bit<8> v) {
        x = v;
    }
    table t {
        key = {
            x: exact;
        }
        actions = {
            set;
            NoAction;
        }
        default_action = NoAction();
    }
    apply {
        bit<8> tmp = 8w0;
        t.apply();
        if (x > 10) {
            exit;
        } else {
            return;
        }
    }
}
";
    assert_eq!(to_p4(&ir, ctl), expected);
}

#[test]
fn unbraced_if_puts_else_on_its_own_line() {
    let mut ir = Ir::new();
    let cond = ir.bool_lit(false);
    let lhs = ir.path("a");
    let rhs = ir.int(1);
    let then = ir.assign(lhs, rhs);
    let otherwise = ir.empty();
    let stmt = ir.if_stmt(cond, then, Some(otherwise));
    let block = ir.block(vec![stmt]);
    let expected = "\
{
    if (false) a = 1;
    else ;
}
";
    assert_eq!(to_p4(&ir, block), expected);
}

#[test]
fn switch_cases_and_fallthrough() {
    let mut ir = Ir::new();
    let apply = ir.apply_call("t", vec![]);
    let subject = ir.member(apply, "action_run");
    let a = ir.path("a");
    let fall = ir.switch_case(a, None);
    let b = ir.path("b");
    let exit = ir.exit();
    let body = ir.block(vec![exit]);
    let case_b = ir.switch_case(b, Some(body));
    let default = ir.default_expr();
    let empty = ir.block(vec![]);
    let case_default = ir.switch_case(default, Some(empty));
    let switch = ir.switch(subject, vec![fall, case_b, case_default]);
    let expected = "\
switch (t.apply().action_run) {
    a:
    b: {
        exit;
    }
    default: {
    }
}
";
    assert_eq!(to_p4(&ir, switch), expected);
}

#[test]
fn parser_states_and_select() {
    let mut ir = Ir::new();
    let hty = ir.type_name("H");
    let hp = ir.param(Direction::Out, "h", hty);

    let start = ir.state("start", vec![], Some("parse_eth"));

    let h = ir.path("h");
    let field = ir.member(h, "ether_type");
    let k1 = ir.bits_lit(16, 0x800);
    let case_ip = ir.select_case(k1, "accept");
    let default = ir.default_expr();
    let case_default = ir.select_case(default, "reject");
    let select = ir.select(vec![field], vec![case_ip, case_default]);
    let b8 = ir.bits(8);
    let local = ir.var("n", b8, None);
    let parse_eth = ir.state_with("parse_eth", vec![local], Some(select));

    let parser = ir.parser("p", vec![], vec![hp], vec![], vec![start, parse_eth]);
    let expected = "\
parser p(out H h) {
    state start {
        transition parse_eth;
    }
    state parse_eth {
        bit<8> n;
        transition select(h.ether_type) {
            16w2048: accept;
            default: reject;
        }
    }
}
";
    assert_eq!(to_p4(&ir, parser), expected);
}

#[test]
fn tuple_keysets_print_in_parentheses() {
    let mut ir = Ir::new();
    let a = ir.path("a");
    let b = ir.path("b");
    let one = ir.int(1);
    let two = ir.int(2);
    let keyset = ir.list(vec![one, two]);
    let case = ir.select_case(keyset, "next");
    let select = ir.select(vec![a, b], vec![case]);
    let expected = "\
select(a, b) {
    (1, 2): next;
}";
    assert_eq!(to_p4(&ir, select), expected);
}

#[test]
fn functions_constants_and_instances() {
    let mut ir = Ir::new();
    let t = ir.type_var("T");
    let tty = ir.type_name("T");
    let x = ir.param(Direction::In, "x", tty);
    let ret_ty = ir.type_name("T");
    let xr = ir.path("x");
    let ret = ir.ret(Some(xr));
    let body = ir.block(vec![ret]);
    let f = ir.function("id", vec![t], vec![x], ret_ty, body);

    let b4 = ir.bits(4);
    let three = ir.int_lit(BigInt::from(3), IntType::bits(4));
    let c = ir.constant_decl("K", b4, three);

    let b32 = ir.bits(32);
    let reg_ty = ir.specialized("Register", vec![b32]);
    let size = ir.int(16);
    let inst = ir.instance("r", reg_ty, vec![size]);

    let b8 = ir.bits(8);
    let zero = ir.int(0);
    let opt = ir.param_with_default(Direction::In, "y", b8, zero);
    let empty = ir.block(vec![]);
    let a = ir.action("a", vec![opt], empty);

    let program = ir.program(vec![f, c, inst, a]);
    let expected = "\
T id<T>(in T x) {
    return x;
}
const bit<4> K = 4w3;
Register<bit<32>>(16) r;
action a(in bit<8> y = 0) {
}
";
    assert_eq!(to_p4(&ir, program), expected);
}

#[test]
fn writer_output_matches_string_output() {
    let mut ir = Ir::new();
    let e = ir.enum_decl("E", &["X"]);
    let program = ir.program(vec![e]);
    let mut buffer = Vec::new();
    crate::write_p4(&ir, program, &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer).unwrap(), to_p4(&ir, program));
}
