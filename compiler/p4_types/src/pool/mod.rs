//! Hash-consing type pool.
//!
//! Every [`Type`] is interned once; structurally equal types receive the same
//! [`TypeId`]. Substitution produces interned results and is cached per
//! `(type, substitution)` pair, so repeated specialization of the same
//! generic is a table lookup.

mod format;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ty::{CallableKind, FunctionType, Param, Type};
use crate::TypeId;

/// Mapping from type variables to replacement types.
///
/// Kept as an ordered list: substitutions are short (one entry per type
/// parameter) and equality must not depend on insertion history.
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct TypeSubst {
    pairs: SmallVec<[(TypeId, TypeId); 4]>,
}

impl TypeSubst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair up type parameters with arguments; extra entries on either side
    /// are ignored.
    pub fn from_pairs(params: &[TypeId], args: &[TypeId]) -> Self {
        let mut subst = Self::new();
        for (&param, &arg) in params.iter().zip(args) {
            subst.insert(param, arg);
        }
        subst
    }

    /// Bind `var` to `ty`, replacing an earlier binding.
    pub fn insert(&mut self, var: TypeId, ty: TypeId) {
        match self.pairs.binary_search_by_key(&var, |&(v, _)| v) {
            Ok(pos) => self.pairs[pos].1 = ty,
            Err(pos) => self.pairs.insert(pos, (var, ty)),
        }
    }

    pub fn get(&self, var: TypeId) -> Option<TypeId> {
        self.pairs
            .binary_search_by_key(&var, |&(v, _)| v)
            .ok()
            .map(|pos| self.pairs[pos].1)
    }

    pub fn binds(&self, var: TypeId) -> bool {
        self.get(var).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, TypeId)> + '_ {
        self.pairs.iter().copied()
    }
}

/// The type pool of one type map.
pub struct TypePool {
    types: Vec<Type>,
    map: FxHashMap<Type, TypeId>,
    subst_cache: FxHashMap<(TypeId, TypeSubst), TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with the primitive types pre-interned at their fixed
    /// indices.
    pub fn new() -> Self {
        let mut pool = TypePool {
            types: Vec::with_capacity(64),
            map: FxHashMap::default(),
            subst_cache: FxHashMap::default(),
        };
        for primitive in [
            Type::Bool,
            Type::Void,
            Type::String,
            Type::InfInt,
            Type::MatchKind,
            Type::State,
            Type::DontCare,
            Type::Error,
        ] {
            pool.intern(primitive);
        }
        pool
    }

    /// Intern a type, returning the canonical id.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.map.get(&ty) {
            return id;
        }
        let id = TypeId::from_raw(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(ty.clone());
        self.map.insert(ty, id);
        id
    }

    /// Look up an interned type.
    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // === Constructors ===

    pub fn bits(&mut self, width: u32, signed: bool) -> TypeId {
        self.intern(Type::Bits { width, signed })
    }

    pub fn tuple(&mut self, components: Vec<TypeId>) -> TypeId {
        self.intern(Type::Tuple(components))
    }

    pub fn type_of(&mut self, ty: TypeId) -> TypeId {
        self.intern(Type::TypeOf(ty))
    }

    pub fn specialized(&mut self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Specialized { base, args })
    }

    pub fn function(
        &mut self,
        kind: CallableKind,
        type_params: Vec<TypeId>,
        params: Vec<Param>,
        ret: TypeId,
    ) -> TypeId {
        self.intern(Type::Function(FunctionType {
            kind,
            type_params,
            params,
            ret,
        }))
    }

    // === Queries ===

    /// `(width, signed)` of a bit-vector type.
    pub fn bits_of(&self, ty: TypeId) -> Option<(u32, bool)> {
        match self.get(ty) {
            Type::Bits { width, signed } => Some((*width, *signed)),
            _ => None,
        }
    }

    /// Bit-vector or `int`.
    pub fn is_integral(&self, ty: TypeId) -> bool {
        ty == TypeId::INF_INT || self.bits_of(ty).is_some()
    }

    /// Whether a type variable occurs anywhere in `ty`.
    pub fn contains_type_vars(&self, ty: TypeId) -> bool {
        match self.get(ty) {
            Type::Var { .. } => true,
            Type::Tuple(components) => components.iter().any(|&c| self.contains_type_vars(c)),
            Type::Specialized { args, .. } => args.iter().any(|&a| self.contains_type_vars(a)),
            Type::TypeOf(inner) => self.contains_type_vars(*inner),
            Type::Function(f) => {
                f.params.iter().any(|p| self.contains_type_vars(p.ty))
                    || self.contains_type_vars(f.ret)
            }
            _ => false,
        }
    }

    // === Substitution ===

    /// Replace type variables according to `subst`.
    ///
    /// Type parameters bound by `subst` are removed from generic types, so
    /// substituting all of a generic's parameters yields a non-generic type.
    pub fn substitute(&mut self, ty: TypeId, subst: &TypeSubst) -> TypeId {
        if subst.is_empty() || ty.is_primitive() {
            return ty;
        }
        let key = (ty, subst.clone());
        if let Some(&hit) = self.subst_cache.get(&key) {
            return hit;
        }

        let result = match self.get(ty).clone() {
            Type::Var { .. } => subst.get(ty).unwrap_or(ty),
            Type::Tuple(components) => {
                let components = self.substitute_all(&components, subst);
                self.tuple(components)
            }
            Type::Specialized { base, args } => {
                let args = self.substitute_all(&args, subst);
                self.specialized(base, args)
            }
            Type::TypeOf(inner) => {
                let inner = self.substitute(inner, subst);
                self.type_of(inner)
            }
            Type::Function(f) => {
                let params = self.substitute_params(&f.params, subst);
                let ret = self.substitute(f.ret, subst);
                let type_params = unbound(&f.type_params, subst);
                self.function(f.kind, type_params, params, ret)
            }
            Type::Extern {
                name,
                decl,
                type_params,
            } => self.intern(Type::Extern {
                name,
                decl,
                type_params: unbound(&type_params, subst),
            }),
            Type::Package {
                name,
                decl,
                type_params,
                ctor_params,
            } => {
                let ctor_params = self.substitute_params(&ctor_params, subst);
                self.intern(Type::Package {
                    name,
                    decl,
                    type_params: unbound(&type_params, subst),
                    ctor_params,
                })
            }
            Type::Control(mut block) => {
                block.apply_params = self.substitute_params(&block.apply_params, subst);
                block.ctor_params = self.substitute_params(&block.ctor_params, subst);
                block.type_params = unbound(&block.type_params, subst);
                self.intern(Type::Control(block))
            }
            Type::Parser(mut block) => {
                block.apply_params = self.substitute_params(&block.apply_params, subst);
                block.ctor_params = self.substitute_params(&block.ctor_params, subst);
                block.type_params = unbound(&block.type_params, subst);
                self.intern(Type::Parser(block))
            }
            Type::Bool
            | Type::Void
            | Type::String
            | Type::InfInt
            | Type::MatchKind
            | Type::State
            | Type::DontCare
            | Type::Error
            | Type::Bits { .. }
            | Type::Struct { .. }
            | Type::Enum { .. }
            | Type::Table { .. }
            | Type::TableApplyResult { .. }
            | Type::ActionEnum { .. } => ty,
        };

        self.subst_cache.insert(key, result);
        result
    }

    fn substitute_all(&mut self, tys: &[TypeId], subst: &TypeSubst) -> Vec<TypeId> {
        tys.iter().map(|&t| self.substitute(t, subst)).collect()
    }

    fn substitute_params(&mut self, params: &[Param], subst: &TypeSubst) -> Vec<Param> {
        params
            .iter()
            .map(|p| Param {
                ty: self.substitute(p.ty, subst),
                ..*p
            })
            .collect()
    }

    /// Number of cached substitution results.
    pub fn substitution_cache_len(&self) -> usize {
        self.subst_cache.len()
    }

    /// Resolve a `Specialized` type to its base with arguments substituted.
    ///
    /// Other types (and arity mismatches, which the checker reports) are
    /// returned unchanged.
    pub fn expand(&mut self, ty: TypeId) -> TypeId {
        let Type::Specialized { base, args } = self.get(ty).clone() else {
            return ty;
        };
        let params = self.get(base).type_params().to_vec();
        if params.len() != args.len() {
            return ty;
        }
        let subst = TypeSubst::from_pairs(&params, &args);
        self.substitute(base, &subst)
    }
}

/// Type parameters of a generic not bound by `subst`.
fn unbound(type_params: &[TypeId], subst: &TypeSubst) -> Vec<TypeId> {
    type_params
        .iter()
        .copied()
        .filter(|&tp| !subst.binds(tp))
        .collect()
}

#[cfg(test)]
mod tests;
