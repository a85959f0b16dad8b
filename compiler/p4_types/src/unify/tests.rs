use p4_ir::{Direction, Ir};
use pretty_assertions::assert_eq;

use super::*;
use crate::ty::BlockType;

struct Fixture {
    ir: Ir,
    pool: TypePool,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            ir: Ir::new(),
            pool: TypePool::new(),
        }
    }

    fn var(&mut self, name: &str) -> TypeId {
        let decl = self.ir.type_var(name);
        let name = self.ir.intern(name);
        self.pool.intern(Type::Var { name, decl })
    }

    fn param(&self, name: &str, direction: Direction, ty: TypeId) -> Param {
        Param {
            name: self.ir.intern(name),
            direction,
            ty,
            optional: false,
        }
    }

    fn control(&mut self, name: &str, type_params: Vec<TypeId>, apply: Vec<Param>) -> TypeId {
        let decl = self.ir.control_type(name, vec![], vec![]);
        let name = self.ir.intern(name);
        self.pool.intern(Type::Control(BlockType {
            name,
            decl,
            type_params,
            apply_params: apply,
            ctor_params: vec![],
        }))
    }
}

#[test]
fn binds_variables_through_tuples() {
    let mut fx = Fixture::new();
    let t = fx.var("T");
    let b8 = fx.pool.bits(8, false);
    let expected = fx.pool.tuple(vec![t, TypeId::BOOL]);
    let found = fx.pool.tuple(vec![b8, TypeId::BOOL]);

    let mut unifier = Unifier::new(&[t]);
    assert_eq!(unifier.unify(&mut fx.pool, expected, found), Ok(()));
    assert_eq!(unifier.binding(t), Some(b8));
}

#[test]
fn rigid_variables_only_match_themselves() {
    let mut fx = Fixture::new();
    let t = fx.var("T");
    let b8 = fx.pool.bits(8, false);
    let mut unifier = Unifier::new(&[]);
    assert_eq!(
        unifier.unify(&mut fx.pool, t, b8),
        Err(UnifyError::Mismatch {
            expected: t,
            found: b8
        })
    );
    assert_eq!(unifier.unify(&mut fx.pool, t, t), Ok(()));
}

#[test]
fn conflicting_bindings_fail() {
    let mut fx = Fixture::new();
    let t = fx.var("T");
    let b8 = fx.pool.bits(8, false);
    let b16 = fx.pool.bits(16, false);
    let mut unifier = Unifier::new(&[t]);
    assert_eq!(unifier.unify(&mut fx.pool, t, b8), Ok(()));
    assert!(unifier.unify(&mut fx.pool, t, b16).is_err());
}

#[test]
fn int_binding_widens_to_bits() {
    let mut fx = Fixture::new();
    let t = fx.var("T");
    let b8 = fx.pool.bits(8, false);
    let mut unifier = Unifier::new(&[t]);
    assert_eq!(unifier.unify(&mut fx.pool, t, TypeId::INF_INT), Ok(()));
    assert_eq!(unifier.unify(&mut fx.pool, t, b8), Ok(()));
    assert_eq!(unifier.binding(t), Some(b8));
    assert_eq!(unifier.unify(&mut fx.pool, t, TypeId::INF_INT), Ok(()));
    assert_eq!(unifier.binding(t), Some(b8));
}

#[test]
fn int_unifies_with_bit_vectors() {
    let mut fx = Fixture::new();
    let b8 = fx.pool.bits(8, false);
    let mut unifier = Unifier::new(&[]);
    assert_eq!(unifier.unify(&mut fx.pool, b8, TypeId::INF_INT), Ok(()));
    assert!(unifier.unify(&mut fx.pool, b8, TypeId::BOOL).is_err());
}

#[test]
fn control_matches_prototype_by_apply_parameters() {
    let mut fx = Fixture::new();
    let h = fx.var("H");
    let hdr = fx.pool.bits(32, false);
    let proto_param = fx.param("h", Direction::InOut, h);
    let proto = fx.control("Ingress", vec![h], vec![proto_param]);
    let impl_param = fx.param("hdr", Direction::InOut, hdr);
    let concrete = fx.control("MyIngress", vec![], vec![impl_param]);

    let pkg_var = fx.var("P");
    let expected = fx.pool.specialized(proto, vec![pkg_var]);
    let mut unifier = Unifier::new(&[pkg_var]);
    assert_eq!(unifier.unify(&mut fx.pool, expected, concrete), Ok(()));
    assert_eq!(unifier.binding(pkg_var), Some(hdr));
}

#[test]
fn direction_mismatch_is_reported() {
    let mut fx = Fixture::new();
    let b8 = fx.pool.bits(8, false);
    let p_in = fx.param("x", Direction::In, b8);
    let p_out = fx.param("x", Direction::Out, b8);
    let a = fx.control("A", vec![], vec![p_in]);
    let b = fx.control("B", vec![], vec![p_out]);
    let mut unifier = Unifier::new(&[]);
    assert_eq!(
        unifier.unify(&mut fx.pool, a, b),
        Err(UnifyError::DirectionMismatch { index: 0 })
    );
}

#[test]
fn tuple_arity_is_checked() {
    let mut fx = Fixture::new();
    let one = fx.pool.tuple(vec![TypeId::BOOL]);
    let two = fx.pool.tuple(vec![TypeId::BOOL, TypeId::BOOL]);
    let mut unifier = Unifier::new(&[]);
    assert_eq!(
        unifier.unify(&mut fx.pool, one, two),
        Err(UnifyError::ArityMismatch {
            expected: 1,
            found: 2
        })
    );
}
