//! Node → type side table.
//!
//! Populated by the type checker and read by later passes (typed constant
//! folding, specialization). Besides the type of each node it records which
//! expressions are left values, which are compile-time constants, and the
//! type arguments inferred for each generic call or instantiation.
//!
//! Clearing the map empties the tables but keeps the pool: `TypeId`s stay
//! valid and re-interning a type yields the same id.

use p4_ir::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::pool::TypePool;
use crate::TypeId;

#[derive(Default)]
pub struct TypeMap {
    pool: TypePool,
    types: FxHashMap<NodeId, TypeId>,
    left_values: FxHashSet<NodeId>,
    constants: FxHashSet<NodeId>,
    type_args: FxHashMap<NodeId, Vec<TypeId>>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut TypePool {
        &mut self.pool
    }

    /// Record the type of `node`, returning the previous type if any.
    pub fn set_type(&mut self, node: NodeId, ty: TypeId) -> Option<TypeId> {
        self.types.insert(node, ty)
    }

    pub fn get_type(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.types.contains_key(&node)
    }

    /// Number of typed nodes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn set_left_value(&mut self, node: NodeId) {
        self.left_values.insert(node);
    }

    pub fn is_left_value(&self, node: NodeId) -> bool {
        self.left_values.contains(&node)
    }

    pub fn set_compile_time_constant(&mut self, node: NodeId) {
        self.constants.insert(node);
    }

    pub fn is_compile_time_constant(&self, node: NodeId) -> bool {
        self.constants.contains(&node)
    }

    /// Record the type arguments of a generic call or instantiation.
    pub fn set_type_args(&mut self, node: NodeId, args: Vec<TypeId>) {
        self.type_args.insert(node, args);
    }

    pub fn type_args(&self, node: NodeId) -> Option<&[TypeId]> {
        self.type_args.get(&node).map(Vec::as_slice)
    }

    /// Copy everything recorded for `from` onto `to`.
    ///
    /// Used when a rewrite replaces a typed node by an equivalent one.
    pub fn copy_entry(&mut self, from: NodeId, to: NodeId) {
        if let Some(ty) = self.get_type(from) {
            self.types.insert(to, ty);
        }
        if self.is_left_value(from) {
            self.left_values.insert(to);
        }
        if self.is_compile_time_constant(from) {
            self.constants.insert(to);
        }
        if let Some(args) = self.type_args.get(&from).cloned() {
            self.type_args.insert(to, args);
        }
    }

    /// Forget all node facts; the pool is kept.
    pub fn clear(&mut self) {
        self.types.clear();
        self.left_values.clear();
        self.constants.clear();
        self.type_args.clear();
    }
}

impl std::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMap")
            .field("types", &self.types.len())
            .field("left_values", &self.left_values.len())
            .field("constants", &self.constants.len())
            .field("pool", &self.pool.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
