//! P4 IR - Intermediate Representation for the P4 frontend
//!
//! This crate contains the core data structures shared by every pass:
//! - Spans for source locations (with a marker for synthesized nodes)
//! - Names for interned identifiers
//! - The node catalog ([`NodeKind`]) and the per-compilation [`Ir`] arena
//! - Read-only ([`Inspector`]) and rewriting ([`Transform`]) traversals
//!
//! # Design Philosophy
//!
//! - **Identity is an index**: nodes live in an append-only arena and are
//!   named by [`NodeId`]. Side tables (reference map, type map) key on it.
//! - **Immutable nodes**: rewriting allocates; unchanged subtrees are shared.
//! - **Closed dispatch**: passes `match` on [`NodeKind`]; the compiler checks
//!   exhaustiveness where it matters.

mod arena;
mod construct;
mod interner;
mod name;
pub mod node;
mod span;
pub mod transform;
pub mod visitor;

pub use arena::Ir;
pub use interner::StringInterner;
pub use name::Name;
pub use node::{BinaryOp, Direction, IntType, Node, NodeId, NodeKind, Path, UnaryOp};
pub use span::Span;
pub use transform::{transform, Rewrite, Transform};
pub use visitor::{inspect, Inspector, Visit};

pub use num_bigint::BigInt;

#[cfg(test)]
mod tests;
