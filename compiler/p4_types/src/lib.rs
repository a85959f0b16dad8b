//! Type system for the P4 frontend.
//!
//! - [`TypeId`]: 32-bit handle, the canonical type representation
//! - [`TypePool`]: hash-consing storage with a substitution cache
//! - [`Unifier`]: type-variable binding for inference
//! - [`TypeMap`]: node → type side table populated by the type checker
//!
//! Translating IR type syntax into pool types needs the reference map and
//! lives with the type checker in `p4_frontend`.

mod idx;
mod pool;
mod ty;
mod type_map;
mod unify;

pub use idx::TypeId;
pub use pool::{TypePool, TypeSubst};
pub use ty::{BlockType, CallableKind, Field, FunctionType, Param, StructKind, Type};
pub use type_map::TypeMap;
pub use unify::{Unifier, UnifyError};
