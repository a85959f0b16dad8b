#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::transform::transform_children;
use crate::*;

/// Shape of a random expression tree, built into an arena by [`build`].
#[derive(Clone, Debug)]
enum Shape {
    Lit(i64),
    Var(u8),
    Unary(Box<Shape>),
    Binary(u8, Box<Shape>, Box<Shape>),
    Mux(Box<Shape>, Box<Shape>, Box<Shape>),
    Call(Vec<Shape>),
}

const OPS: [BinaryOp; 6] = [
    BinaryOp::Add,
    BinaryOp::Mul,
    BinaryOp::BAnd,
    BinaryOp::Equ,
    BinaryOp::Shl,
    BinaryOp::LAnd,
];

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (-4i64..300).prop_map(Shape::Lit),
        (0u8..4).prop_map(Shape::Var),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::Unary(Box::new(s))),
            (0u8..6, inner.clone(), inner.clone())
                .prop_map(|(op, l, r)| Shape::Binary(op, Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| Shape::Mux(Box::new(c), Box::new(t), Box::new(e))),
            prop::collection::vec(inner, 0..3).prop_map(Shape::Call),
        ]
    })
}

fn build(ir: &mut Ir, shape: &Shape) -> NodeId {
    match shape {
        Shape::Lit(v) => ir.int(*v),
        Shape::Var(v) => ir.path(&format!("v{v}")),
        Shape::Unary(s) => {
            let operand = build(ir, s);
            ir.unary(UnaryOp::Neg, operand)
        }
        Shape::Binary(op, l, r) => {
            let left = build(ir, l);
            let right = build(ir, r);
            ir.binary(OPS[usize::from(*op) % OPS.len()], left, right)
        }
        Shape::Mux(c, t, e) => {
            let cond = build(ir, c);
            let if_true = build(ir, t);
            let if_false = build(ir, e);
            ir.mux(cond, if_true, if_false)
        }
        Shape::Call(args) => {
            let method = ir.path("f");
            let args = args.iter().map(|a| build(ir, a)).collect();
            ir.call(method, args)
        }
    }
}

/// Transform with no hooks.
struct Identity;

impl Transform for Identity {}

/// Replaces every literal `0` with `1`.
struct ZeroToOne;

impl Transform for ZeroToOne {
    fn postorder(&mut self, ir: &mut Ir, _original: NodeId, id: NodeId) -> NodeId {
        let is_zero =
            matches!(ir.kind(id), NodeKind::Constant { value, .. } if *value == BigInt::from(0));
        if is_zero {
            ir.int(1)
        } else {
            id
        }
    }
}

struct CountNodes {
    pre: usize,
    post: usize,
    prune_calls: bool,
}

impl Inspector for CountNodes {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        self.pre += 1;
        if self.prune_calls && matches!(ir.kind(id), NodeKind::MethodCall { .. }) {
            return Visit::Prune;
        }
        Visit::Continue
    }

    fn postorder(&mut self, _ir: &Ir, _id: NodeId) {
        self.post += 1;
    }
}

proptest! {
    #[test]
    fn identity_transform_preserves_identity(shape in shape_strategy()) {
        let mut ir = Ir::new();
        let root = build(&mut ir, &shape);
        let before = ir.len();
        let result = transform(&mut Identity, &mut ir, root);
        prop_assert_eq!(result, root);
        prop_assert_eq!(ir.len(), before);
    }

    #[test]
    fn rewrite_is_structurally_idempotent(shape in shape_strategy()) {
        let mut ir = Ir::new();
        let root = build(&mut ir, &shape);
        let once = transform(&mut ZeroToOne, &mut ir, root);
        let twice = transform(&mut ZeroToOne, &mut ir, once);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn deep_clone_is_equal_but_distinct(shape in shape_strategy()) {
        let mut ir = Ir::new();
        let root = build(&mut ir, &shape);
        let copy = ir.deep_clone(root);
        prop_assert_ne!(copy, root);
        prop_assert!(ir.structurally_equal(root, copy));
    }
}

#[test]
fn unchanged_siblings_are_shared() {
    let mut ir = Ir::new();
    let x = ir.path("x");
    let zero = ir.int(0);
    let sum = ir.binary(BinaryOp::Add, x, zero);

    let result = transform(&mut ZeroToOne, &mut ir, sum);
    assert_ne!(result, sum);
    let NodeKind::Binary { left, right, .. } = ir.kind(result).clone() else {
        panic!("expected a binary node");
    };
    assert_eq!(left, x);
    assert_ne!(right, zero);
    assert!(matches!(ir.kind(right), NodeKind::Constant { value, .. } if *value == BigInt::from(1)));
}

#[test]
fn transform_children_returns_same_id_without_change() {
    let mut ir = Ir::new();
    let a = ir.path("a");
    let b = ir.path("b");
    let assign = ir.assign(a, b);
    assert_eq!(transform_children(&mut Identity, &mut ir, assign), assign);
}

#[test]
fn structural_equality_ignores_identity() {
    let mut ir = Ir::new();
    let a1 = ir.bits_lit(8, 3);
    let a2 = ir.bits_lit(8, 3);
    let b = ir.bits_lit(16, 3);
    assert!(ir.structurally_equal(a1, a2));
    assert!(!ir.structurally_equal(a1, b));

    let x = ir.path("x");
    let y = ir.path("y");
    let s1 = ir.binary(BinaryOp::Add, x, a1);
    let s2 = ir.binary(BinaryOp::Add, y, a2);
    assert!(!ir.structurally_equal(s1, s2));
}

#[test]
fn deep_clone_with_substitutes_subtrees() {
    let mut ir = Ir::new();
    let t = ir.type_name("T");
    let x = ir.var("x", t, None);
    let eight = ir.bits(8);

    let copy = ir.deep_clone_with(x, &mut |ir: &mut Ir, id| {
        matches!(ir.kind(id), NodeKind::TypeName { .. }).then_some(eight)
    });
    let NodeKind::DeclVariable { ty, name, .. } = ir.kind(copy).clone() else {
        panic!("expected a variable");
    };
    assert_eq!(ty, eight);
    assert_eq!(ir.name_str(name), "x");
}

#[test]
fn inspector_prune_skips_children_and_postorder() {
    let mut ir = Ir::new();
    let f = ir.path("f");
    let arg = ir.int(1);
    let call = ir.call(f, vec![arg]);
    let x = ir.path("x");
    let sum = ir.binary(BinaryOp::Add, x, call);

    let mut all = CountNodes {
        pre: 0,
        post: 0,
        prune_calls: false,
    };
    inspect(&mut all, &ir, sum);
    assert_eq!((all.pre, all.post), (5, 5));

    let mut pruned = CountNodes {
        pre: 0,
        post: 0,
        prune_calls: true,
    };
    inspect(&mut pruned, &ir, sum);
    assert_eq!((pruned.pre, pruned.post), (3, 2));
}

#[test]
fn child_order_matches_map_order() {
    let mut ir = Ir::new();
    let c = ir.bool_lit(true);
    let t = ir.empty();
    let e = ir.exit();
    let stmt = ir.if_stmt(c, t, Some(e));
    let mut mapped = Vec::new();
    let _ = ir.kind(stmt).map_children(|id| {
        mapped.push(id);
        id
    });
    assert_eq!(ir.kind(stmt).children(), mapped);
    assert_eq!(mapped, vec![c, t, e]);
}

#[test]
fn has_side_effects_finds_nested_calls() {
    let mut ir = Ir::new();
    let f = ir.path("f");
    let call = ir.call(f, vec![]);
    let x = ir.path("x");
    let sum = ir.binary(BinaryOp::Add, x, call);
    let pure = ir.binary(BinaryOp::Add, x, x);
    assert!(ir.has_side_effects(sum));
    assert!(!ir.has_side_effects(pure));
}
