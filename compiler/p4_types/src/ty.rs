//! Type representation stored in the pool.
//!
//! A [`Type`] refers to its components by [`TypeId`], so interning a type
//! interns a flat record. Nominal types (structs, headers, enums, externs,
//! blocks, tables) carry the declaring node; two declarations with the same
//! shape are different types.

use p4_ir::{Direction, Name, NodeId};

use crate::TypeId;

/// Which flavor of aggregate a [`Type::Struct`] is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StructKind {
    Struct,
    Header,
    HeaderUnion,
}

impl StructKind {
    pub fn keyword(self) -> &'static str {
        match self {
            StructKind::Struct => "struct",
            StructKind::Header => "header",
            StructKind::HeaderUnion => "header_union",
        }
    }
}

/// Named field of an aggregate.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Field {
    pub name: Name,
    pub ty: TypeId,
}

/// A callable's parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub direction: Direction,
    pub ty: TypeId,
    /// The parameter has a default value and may be omitted.
    pub optional: bool,
}

/// What kind of callable a [`FunctionType`] describes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallableKind {
    Function,
    Action,
    /// Extern method (or extern constructor).
    Method,
    /// `apply` of a table, control, or parser.
    Apply,
    /// Built-in methods such as `isValid()`.
    Builtin,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionType {
    pub kind: CallableKind,
    pub type_params: Vec<TypeId>,
    pub params: Vec<Param>,
    pub ret: TypeId,
}

/// Controls and parsers: a declaration or a prototype.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockType {
    pub name: Name,
    pub decl: NodeId,
    pub type_params: Vec<TypeId>,
    pub apply_params: Vec<Param>,
    pub ctor_params: Vec<Param>,
}

/// The closed set of frontend types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Bool,
    Void,
    String,
    InfInt,
    MatchKind,
    State,
    DontCare,
    Error,
    /// `bit<w>` / `int<w>`
    Bits {
        width: u32,
        signed: bool,
    },
    Struct {
        kind: StructKind,
        name: Name,
        decl: NodeId,
        fields: Vec<Field>,
    },
    Enum {
        name: Name,
        decl: NodeId,
        members: Vec<Name>,
    },
    Tuple(Vec<TypeId>),
    /// A type parameter, identified by its declaring `TypeVar` node.
    Var {
        name: Name,
        decl: NodeId,
    },
    Function(FunctionType),
    Extern {
        name: Name,
        decl: NodeId,
        type_params: Vec<TypeId>,
    },
    Package {
        name: Name,
        decl: NodeId,
        type_params: Vec<TypeId>,
        ctor_params: Vec<Param>,
    },
    Control(BlockType),
    Parser(BlockType),
    Table {
        name: Name,
        decl: NodeId,
    },
    /// Result of `t.apply()`: has `hit`, `miss`, and `action_run`.
    TableApplyResult {
        table: NodeId,
    },
    /// Type of `t.apply().action_run`; switch labels are action names.
    ActionEnum {
        table: NodeId,
    },
    /// A generic type applied to arguments.
    Specialized {
        base: TypeId,
        args: Vec<TypeId>,
    },
    /// The type of an expression that denotes a type (`E` in `E.member`).
    TypeOf(TypeId),
}

impl Type {
    /// Type parameters declared by a generic type (empty for others).
    pub fn type_params(&self) -> &[TypeId] {
        match self {
            Type::Function(f) => &f.type_params,
            Type::Extern { type_params, .. } | Type::Package { type_params, .. } => type_params,
            Type::Control(b) | Type::Parser(b) => &b.type_params,
            _ => &[],
        }
    }

    /// Name of a nominal type.
    pub fn nominal_name(&self) -> Option<Name> {
        match self {
            Type::Struct { name, .. }
            | Type::Enum { name, .. }
            | Type::Var { name, .. }
            | Type::Extern { name, .. }
            | Type::Package { name, .. }
            | Type::Table { name, .. } => Some(*name),
            Type::Control(b) | Type::Parser(b) => Some(b.name),
            _ => None,
        }
    }

    /// Declaring node of a nominal type.
    pub fn decl(&self) -> Option<NodeId> {
        match self {
            Type::Struct { decl, .. }
            | Type::Enum { decl, .. }
            | Type::Var { decl, .. }
            | Type::Extern { decl, .. }
            | Type::Package { decl, .. }
            | Type::Table { decl, .. } => Some(*decl),
            Type::Control(b) | Type::Parser(b) => Some(b.decl),
            _ => None,
        }
    }
}
