//! Unification with type-variable binding.
//!
//! Used for generic-call inference and for checking that a block instance
//! fits a prototype parameter. Only the variables listed as *bindable* are
//! bound; any other type variable is rigid and matches only itself.
//!
//! `int` unifies with any bit-vector type: the checker inserts the cast.

use crate::pool::{TypePool, TypeSubst};
use crate::ty::{Param, Type};
use crate::TypeId;

/// Error from type unification.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnifyError {
    /// Types could not be unified.
    Mismatch { expected: TypeId, found: TypeId },
    /// Different number of parameters, components, or type arguments.
    ArityMismatch { expected: usize, found: usize },
    /// Parameter directions differ.
    DirectionMismatch { index: usize },
}

/// Unification state: which variables may be bound, and their bindings.
#[derive(Clone, Debug, Default)]
pub struct Unifier {
    bindable: Vec<TypeId>,
    bindings: TypeSubst,
}

impl Unifier {
    /// A unifier that may bind the given type variables.
    pub fn new(bindable: &[TypeId]) -> Self {
        Unifier {
            bindable: bindable.to_vec(),
            bindings: TypeSubst::new(),
        }
    }

    /// Allow binding more variables.
    pub fn add_bindable(&mut self, vars: &[TypeId]) {
        self.bindable.extend_from_slice(vars);
    }

    /// Current binding of `var`.
    pub fn binding(&self, var: TypeId) -> Option<TypeId> {
        self.bindings.get(var)
    }

    /// All bindings so far.
    pub fn bindings(&self) -> &TypeSubst {
        &self.bindings
    }

    pub fn into_bindings(self) -> TypeSubst {
        self.bindings
    }

    fn is_bindable(&self, ty: TypeId) -> bool {
        self.bindable.contains(&ty)
    }

    /// Unify `expected` with `found`, recording bindings.
    pub fn unify(
        &mut self,
        pool: &mut TypePool,
        expected: TypeId,
        found: TypeId,
    ) -> Result<(), UnifyError> {
        if expected == found
            || expected == TypeId::DONT_CARE
            || found == TypeId::DONT_CARE
            || expected.is_error()
            || found.is_error()
        {
            return Ok(());
        }

        if self.is_bindable(expected) {
            return self.bind(pool, expected, found);
        }
        if self.is_bindable(found) {
            return self.bind(pool, found, expected);
        }

        let mismatch = UnifyError::Mismatch { expected, found };

        // Implicit `int` → bit-vector conversion.
        if (expected == TypeId::INF_INT && pool.bits_of(found).is_some())
            || (found == TypeId::INF_INT && pool.bits_of(expected).is_some())
        {
            return Ok(());
        }

        let expected = pool.expand(expected);
        let found = pool.expand(found);
        if expected == found {
            return Ok(());
        }

        match (pool.get(expected).clone(), pool.get(found).clone()) {
            (Type::Tuple(a), Type::Tuple(b)) => self.unify_lists(pool, &a, &b),
            (Type::TypeOf(a), Type::TypeOf(b)) => self.unify(pool, a, b),
            (
                Type::Specialized {
                    base: base_a,
                    args: a,
                },
                Type::Specialized {
                    base: base_b,
                    args: b,
                },
            ) if base_a == base_b => self.unify_lists(pool, &a, &b),
            (Type::Function(a), Type::Function(b)) => {
                self.unify_params(pool, &a.params, &b.params)?;
                self.unify(pool, a.ret, b.ret)
            }
            (Type::Control(a), Type::Control(b)) | (Type::Parser(a), Type::Parser(b)) => {
                self.unify_params(pool, &a.apply_params, &b.apply_params)
            }
            (
                Type::Package {
                    decl: decl_a,
                    ctor_params: a,
                    ..
                },
                Type::Package {
                    decl: decl_b,
                    ctor_params: b,
                    ..
                },
            ) if decl_a == decl_b => self.unify_params(pool, &a, &b),
            (
                Type::Extern { decl: decl_a, .. },
                Type::Extern { decl: decl_b, .. },
            ) if decl_a == decl_b => Ok(()),
            _ => Err(mismatch),
        }
    }

    fn bind(&mut self, pool: &mut TypePool, var: TypeId, ty: TypeId) -> Result<(), UnifyError> {
        match self.bindings.get(var) {
            Some(bound) if bound == ty => Ok(()),
            Some(bound) => {
                // A literal first bound to `int` is widened by a later bit-vector use.
                if bound == TypeId::INF_INT && pool.bits_of(ty).is_some() {
                    self.bindings.insert(var, ty);
                    return Ok(());
                }
                if ty == TypeId::INF_INT && pool.bits_of(bound).is_some() {
                    return Ok(());
                }
                self.unify(pool, bound, ty)
            }
            None => {
                self.bindings.insert(var, ty);
                Ok(())
            }
        }
    }

    fn unify_lists(
        &mut self,
        pool: &mut TypePool,
        expected: &[TypeId],
        found: &[TypeId],
    ) -> Result<(), UnifyError> {
        if expected.len() != found.len() {
            return Err(UnifyError::ArityMismatch {
                expected: expected.len(),
                found: found.len(),
            });
        }
        for (&e, &f) in expected.iter().zip(found) {
            self.unify(pool, e, f)?;
        }
        Ok(())
    }

    fn unify_params(
        &mut self,
        pool: &mut TypePool,
        expected: &[Param],
        found: &[Param],
    ) -> Result<(), UnifyError> {
        if expected.len() != found.len() {
            return Err(UnifyError::ArityMismatch {
                expected: expected.len(),
                found: found.len(),
            });
        }
        for (index, (e, f)) in expected.iter().zip(found).enumerate() {
            if e.direction != f.direction {
                return Err(UnifyError::DirectionMismatch { index });
            }
            self.unify(pool, e.ty, f.ty)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
