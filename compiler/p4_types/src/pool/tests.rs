use p4_ir::{Direction, Ir};
use pretty_assertions::assert_eq;

use super::*;
use crate::ty::{BlockType, StructKind};

fn param(ir: &Ir, name: &str, direction: Direction, ty: TypeId) -> Param {
    Param {
        name: ir.intern(name),
        direction,
        ty,
        optional: false,
    }
}

#[test]
fn primitives_have_fixed_indices() {
    let mut pool = TypePool::new();
    assert_eq!(pool.intern(Type::Bool), TypeId::BOOL);
    assert_eq!(pool.intern(Type::InfInt), TypeId::INF_INT);
    assert_eq!(pool.intern(Type::Error), TypeId::ERROR);
    assert_eq!(pool.len(), TypeId::PRIMITIVE_COUNT as usize);
}

#[test]
fn structurally_equal_types_share_an_id() {
    let mut pool = TypePool::new();
    let a = pool.bits(8, false);
    let b = pool.bits(8, false);
    let c = pool.bits(8, true);
    assert_eq!(a, b);
    assert_ne!(a, c);

    let t1 = pool.tuple(vec![a, TypeId::BOOL]);
    let t2 = pool.tuple(vec![b, TypeId::BOOL]);
    assert_eq!(t1, t2);
}

#[test]
fn nominal_types_are_distinguished_by_declaration() {
    let mut ir = Ir::new();
    let s1 = ir.struct_decl("S", vec![]);
    let s2 = ir.struct_decl("S", vec![]);
    let name = ir.intern("S");
    let mut pool = TypePool::new();
    let a = pool.intern(Type::Struct {
        kind: StructKind::Struct,
        name,
        decl: s1,
        fields: vec![],
    });
    let b = pool.intern(Type::Struct {
        kind: StructKind::Struct,
        name,
        decl: s2,
        fields: vec![],
    });
    assert_ne!(a, b);
}

#[test]
fn substitution_is_interned_and_cached() {
    let mut ir = Ir::new();
    let tv = ir.type_var("T");
    let mut pool = TypePool::new();
    let t = pool.intern(Type::Var {
        name: ir.intern("T"),
        decl: tv,
    });
    let b8 = pool.bits(8, false);
    let x = param(&ir, "x", Direction::In, t);
    let generic = pool.function(CallableKind::Function, vec![t], vec![x], t);

    let subst = TypeSubst::from_pairs(&[t], &[b8]);
    let first = pool.substitute(generic, &subst);
    let cached = pool.substitution_cache_len();
    let second = pool.substitute(generic, &subst);

    assert_eq!(first, second);
    assert_eq!(pool.substitution_cache_len(), cached);

    let Type::Function(f) = pool.get(first) else {
        panic!("expected a function type");
    };
    assert!(f.type_params.is_empty());
    assert_eq!(f.params[0].ty, b8);
    assert_eq!(f.ret, b8);
}

#[test]
fn expand_specialized_control() {
    let mut ir = Ir::new();
    let h_decl = ir.type_var("H");
    let proto = ir.control_type("Ingress", vec![h_decl], vec![]);
    let mut pool = TypePool::new();
    let h = pool.intern(Type::Var {
        name: ir.intern("H"),
        decl: h_decl,
    });
    let control = pool.intern(Type::Control(BlockType {
        name: ir.intern("Ingress"),
        decl: proto,
        type_params: vec![h],
        apply_params: vec![param(&ir, "h", Direction::InOut, h)],
        ctor_params: vec![],
    }));
    let b16 = pool.bits(16, false);
    let specialized = pool.specialized(control, vec![b16]);

    let expanded = pool.expand(specialized);
    let Type::Control(block) = pool.get(expanded) else {
        panic!("expected a control type");
    };
    assert!(block.type_params.is_empty());
    assert_eq!(block.apply_params[0].ty, b16);
    assert_eq!(block.apply_params[0].direction, Direction::InOut);
}

#[test]
fn expand_with_wrong_arity_is_identity() {
    let mut pool = TypePool::new();
    let b8 = pool.bits(8, false);
    let s = pool.specialized(b8, vec![b8]);
    assert_eq!(pool.expand(s), s);
}

#[test]
fn subst_insert_replaces_binding() {
    let a = TypeId::from_raw(20);
    let b = TypeId::from_raw(10);
    let mut subst = TypeSubst::new();
    subst.insert(a, TypeId::BOOL);
    subst.insert(b, TypeId::STRING);
    subst.insert(a, TypeId::VOID);
    assert_eq!(subst.len(), 2);
    assert_eq!(subst.get(a), Some(TypeId::VOID));
    assert_eq!(
        subst.iter().collect::<Vec<_>>(),
        vec![(b, TypeId::STRING), (a, TypeId::VOID)]
    );
}

#[test]
fn display_renders_surface_syntax() {
    let ir = Ir::new();
    let mut pool = TypePool::new();
    let b8 = pool.bits(8, false);
    let i4 = pool.bits(4, true);
    let tuple = pool.tuple(vec![b8, TypeId::BOOL]);
    let x = param(&ir, "x", Direction::Out, i4);
    let func = pool.function(CallableKind::Action, vec![], vec![x], TypeId::VOID);
    let interner = ir.interner();

    assert_eq!(pool.display(b8, interner), "bit<8>");
    assert_eq!(pool.display(i4, interner), "int<4>");
    assert_eq!(pool.display(tuple, interner), "tuple<bit<8>, bool>");
    assert_eq!(pool.display(func, interner), "(out int<4>) -> void");
    assert_eq!(pool.display(TypeId::INF_INT, interner), "int");
}

#[test]
fn type_vars_are_detected_through_structure() {
    let mut ir = Ir::new();
    let tv = ir.type_var("T");
    let mut pool = TypePool::new();
    let t = pool.intern(Type::Var {
        name: ir.intern("T"),
        decl: tv,
    });
    let tuple = pool.tuple(vec![TypeId::BOOL, t]);
    let plain = pool.tuple(vec![TypeId::BOOL]);
    assert!(pool.contains_type_vars(tuple));
    assert!(!pool.contains_type_vars(plain));
}
