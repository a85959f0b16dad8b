//! IR node catalog.
//!
//! Every node is a [`NodeKind`] variant stored in the [`Ir`](crate::Ir) arena.
//! Children are referenced by [`NodeId`]; leaf attributes (names, operators,
//! literal values) are stored inline. The order of child fields in each
//! variant is the traversal order.

mod children;

use std::fmt;

use num_bigint::BigInt;

use crate::{Name, Span};

/// Identity of a node within an [`Ir`](crate::Ir) arena.
///
/// Two nodes with identical contents but different ids are distinct nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Id used when comparing node payloads without their children.
    pub(crate) const PLACEHOLDER: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameter direction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Direction {
    /// Directionless: constructor parameters and control-plane action data.
    None,
    In,
    Out,
    InOut,
}

impl Direction {
    /// Whether the argument is read before the call.
    pub fn is_in(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// Whether the argument is written by the call.
    pub fn is_out(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::None => "",
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
        }
    }
}

/// The literal type carried by an integer [`NodeKind::Constant`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IntType {
    /// Arbitrary-precision `int` (an unsized literal).
    Infinite,
    /// `bit<width>` or `int<width>`.
    Bits { width: u32, signed: bool },
}

impl IntType {
    /// Unsigned `bit<width>`.
    pub const fn bits(width: u32) -> Self {
        IntType::Bits {
            width,
            signed: false,
        }
    }

    /// Signed `int<width>`.
    pub const fn signed(width: u32) -> Self {
        IntType::Bits {
            width,
            signed: true,
        }
    }
}

/// A possibly absolute name reference (`x` or `.x`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Path {
    pub name: Name,
    /// `.x`, resolved in the program scope.
    pub absolute: bool,
}

impl Path {
    pub const fn new(name: Name) -> Self {
        Path {
            name,
            absolute: false,
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `-e`
    Neg,
    /// `~e`
    Cmpl,
    /// `!e`
    LNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Cmpl => "~",
            UnaryOp::LNot => "!",
        }
    }
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BAnd,
    BOr,
    BXor,
    LAnd,
    LOr,
    Equ,
    Neq,
    Lss,
    Leq,
    Grt,
    Geq,
    /// `++` bit-string concatenation.
    Concat,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BAnd => "&",
            BinaryOp::BOr => "|",
            BinaryOp::BXor => "^",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Equ => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Grt => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::Concat => "++",
        }
    }

    /// Binding strength used by the printer; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LOr => 1,
            BinaryOp::LAnd => 2,
            BinaryOp::Equ | BinaryOp::Neq => 3,
            BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Grt | BinaryOp::Geq => 4,
            BinaryOp::BOr => 5,
            BinaryOp::BXor => 6,
            BinaryOp::BAnd => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Concat | BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equ
                | BinaryOp::Neq
                | BinaryOp::Lss
                | BinaryOp::Leq
                | BinaryOp::Grt
                | BinaryOp::Geq
        )
    }
}

/// A node stored in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// The closed set of IR node kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // === Program ===
    Program {
        decls: Vec<NodeId>,
    },

    // === Type syntax ===
    TypeBits {
        width: u32,
        signed: bool,
    },
    TypeBool,
    TypeVoid,
    TypeString,
    /// `int`
    TypeInfInt,
    TypeName {
        path: Path,
    },
    /// `Base<args>`; `base` is a `TypeName`.
    TypeSpecialized {
        base: NodeId,
        args: Vec<NodeId>,
    },
    TypeTuple {
        components: Vec<NodeId>,
    },

    // === Type declarations ===
    /// A type parameter declaration.
    TypeVar {
        name: Name,
    },
    StructField {
        name: Name,
        ty: NodeId,
    },
    TypeStruct {
        name: Name,
        fields: Vec<NodeId>,
    },
    TypeHeader {
        name: Name,
        fields: Vec<NodeId>,
    },
    TypeHeaderUnion {
        name: Name,
        fields: Vec<NodeId>,
    },
    TypeEnum {
        name: Name,
        members: Vec<NodeId>,
    },
    /// Member of an enum or a `match_kind` declaration.
    DeclarationId {
        name: Name,
    },
    TypeTypedef {
        name: Name,
        ty: NodeId,
    },
    TypeExtern {
        name: Name,
        type_params: Vec<NodeId>,
        methods: Vec<NodeId>,
    },
    /// Extern method prototype; a constructor has the extern's name and a
    /// `TypeVoid` return type.
    Method {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        return_type: NodeId,
    },
    TypePackage {
        name: Name,
        type_params: Vec<NodeId>,
        ctor_params: Vec<NodeId>,
    },
    /// Control prototype (`control C<H>(inout H h);`).
    TypeControl {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
    },
    /// Parser prototype.
    TypeParser {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
    },
    DeclMatchKind {
        members: Vec<NodeId>,
    },

    // === Declarations ===
    Parameter {
        name: Name,
        direction: Direction,
        ty: NodeId,
        default_value: Option<NodeId>,
    },
    DeclVariable {
        name: Name,
        ty: NodeId,
        init: Option<NodeId>,
    },
    DeclConstant {
        name: Name,
        ty: NodeId,
        init: NodeId,
    },
    /// `Type(args) name;`
    DeclInstance {
        name: Name,
        ty: NodeId,
        args: Vec<NodeId>,
    },
    Function {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        return_type: NodeId,
        body: NodeId,
    },
    Action {
        name: Name,
        params: Vec<NodeId>,
        body: NodeId,
    },
    Control {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        ctor_params: Vec<NodeId>,
        locals: Vec<NodeId>,
        body: NodeId,
    },
    Parser {
        name: Name,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        ctor_params: Vec<NodeId>,
        locals: Vec<NodeId>,
        states: Vec<NodeId>,
    },
    ParserState {
        name: Name,
        components: Vec<NodeId>,
        /// `PathExpression` naming a state, or a `SelectExpression`.
        transition: Option<NodeId>,
    },
    Table {
        name: Name,
        params: Vec<NodeId>,
        properties: Vec<NodeId>,
    },
    Property {
        name: Name,
        value: NodeId,
        is_const: bool,
    },
    Key {
        elements: Vec<NodeId>,
    },
    KeyElement {
        expr: NodeId,
        /// `PathExpression` naming a `match_kind` member.
        match_kind: NodeId,
    },
    ActionList {
        elements: Vec<NodeId>,
    },
    ExpressionValue {
        expr: NodeId,
    },

    // === Expressions ===
    Constant {
        value: BigInt,
        ty: IntType,
        base: u32,
    },
    BoolLiteral {
        value: bool,
    },
    StringLiteral {
        value: Name,
    },
    PathExpression {
        path: Path,
    },
    Member {
        expr: NodeId,
        member: Name,
    },
    /// `expr[high:low]`
    Slice {
        expr: NodeId,
        high: NodeId,
        low: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    /// `cond ? if_true : if_false`
    Mux {
        cond: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    Cast {
        ty: NodeId,
        expr: NodeId,
    },
    MethodCall {
        method: NodeId,
        type_args: Vec<NodeId>,
        args: Vec<NodeId>,
    },
    ListExpression {
        components: Vec<NodeId>,
    },
    SelectExpression {
        select: NodeId,
        cases: Vec<NodeId>,
    },
    SelectCase {
        keyset: NodeId,
        state: NodeId,
    },
    /// `default` / `_` in keysets and switch labels.
    DefaultExpression,

    // === Statements ===
    Assignment {
        left: NodeId,
        right: NodeId,
    },
    MethodCallStatement {
        call: NodeId,
    },
    IfStatement {
        cond: NodeId,
        if_true: NodeId,
        if_false: Option<NodeId>,
    },
    BlockStatement {
        components: Vec<NodeId>,
    },
    ReturnStatement {
        expr: Option<NodeId>,
    },
    ExitStatement,
    EmptyStatement,
    SwitchStatement {
        expr: NodeId,
        cases: Vec<NodeId>,
    },
    /// `label: stmt`; a missing statement falls through to the next case.
    SwitchCase {
        label: NodeId,
        stmt: Option<NodeId>,
    },
}

impl NodeKind {
    /// Short tag naming the kind, used in logs and diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::TypeBits { .. } => "TypeBits",
            NodeKind::TypeBool => "TypeBool",
            NodeKind::TypeVoid => "TypeVoid",
            NodeKind::TypeString => "TypeString",
            NodeKind::TypeInfInt => "TypeInfInt",
            NodeKind::TypeName { .. } => "TypeName",
            NodeKind::TypeSpecialized { .. } => "TypeSpecialized",
            NodeKind::TypeTuple { .. } => "TypeTuple",
            NodeKind::TypeVar { .. } => "TypeVar",
            NodeKind::StructField { .. } => "StructField",
            NodeKind::TypeStruct { .. } => "TypeStruct",
            NodeKind::TypeHeader { .. } => "TypeHeader",
            NodeKind::TypeHeaderUnion { .. } => "TypeHeaderUnion",
            NodeKind::TypeEnum { .. } => "TypeEnum",
            NodeKind::DeclarationId { .. } => "DeclarationId",
            NodeKind::TypeTypedef { .. } => "TypeTypedef",
            NodeKind::TypeExtern { .. } => "TypeExtern",
            NodeKind::Method { .. } => "Method",
            NodeKind::TypePackage { .. } => "TypePackage",
            NodeKind::TypeControl { .. } => "TypeControl",
            NodeKind::TypeParser { .. } => "TypeParser",
            NodeKind::DeclMatchKind { .. } => "DeclMatchKind",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::DeclVariable { .. } => "DeclVariable",
            NodeKind::DeclConstant { .. } => "DeclConstant",
            NodeKind::DeclInstance { .. } => "DeclInstance",
            NodeKind::Function { .. } => "Function",
            NodeKind::Action { .. } => "Action",
            NodeKind::Control { .. } => "Control",
            NodeKind::Parser { .. } => "Parser",
            NodeKind::ParserState { .. } => "ParserState",
            NodeKind::Table { .. } => "Table",
            NodeKind::Property { .. } => "Property",
            NodeKind::Key { .. } => "Key",
            NodeKind::KeyElement { .. } => "KeyElement",
            NodeKind::ActionList { .. } => "ActionList",
            NodeKind::ExpressionValue { .. } => "ExpressionValue",
            NodeKind::Constant { .. } => "Constant",
            NodeKind::BoolLiteral { .. } => "BoolLiteral",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::PathExpression { .. } => "PathExpression",
            NodeKind::Member { .. } => "Member",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Mux { .. } => "Mux",
            NodeKind::Cast { .. } => "Cast",
            NodeKind::MethodCall { .. } => "MethodCall",
            NodeKind::ListExpression { .. } => "ListExpression",
            NodeKind::SelectExpression { .. } => "SelectExpression",
            NodeKind::SelectCase { .. } => "SelectCase",
            NodeKind::DefaultExpression => "DefaultExpression",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::MethodCallStatement { .. } => "MethodCallStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::ExitStatement => "ExitStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
        }
    }

    /// The declared name, for kinds that introduce one.
    pub fn declared_name(&self) -> Option<Name> {
        match self {
            NodeKind::TypeVar { name }
            | NodeKind::StructField { name, .. }
            | NodeKind::TypeStruct { name, .. }
            | NodeKind::TypeHeader { name, .. }
            | NodeKind::TypeHeaderUnion { name, .. }
            | NodeKind::TypeEnum { name, .. }
            | NodeKind::DeclarationId { name }
            | NodeKind::TypeTypedef { name, .. }
            | NodeKind::TypeExtern { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::TypePackage { name, .. }
            | NodeKind::TypeControl { name, .. }
            | NodeKind::TypeParser { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::DeclVariable { name, .. }
            | NodeKind::DeclConstant { name, .. }
            | NodeKind::DeclInstance { name, .. }
            | NodeKind::Function { name, .. }
            | NodeKind::Action { name, .. }
            | NodeKind::Control { name, .. }
            | NodeKind::Parser { name, .. }
            | NodeKind::ParserState { name, .. }
            | NodeKind::Table { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Whether this kind declares a type (usable in a `TypeName`).
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::TypeVar { .. }
                | NodeKind::TypeStruct { .. }
                | NodeKind::TypeHeader { .. }
                | NodeKind::TypeHeaderUnion { .. }
                | NodeKind::TypeEnum { .. }
                | NodeKind::TypeTypedef { .. }
                | NodeKind::TypeExtern { .. }
                | NodeKind::TypePackage { .. }
                | NodeKind::TypeControl { .. }
                | NodeKind::TypeParser { .. }
                | NodeKind::Control { .. }
                | NodeKind::Parser { .. }
        )
    }

    /// Whether this kind is an expression.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Constant { .. }
                | NodeKind::BoolLiteral { .. }
                | NodeKind::StringLiteral { .. }
                | NodeKind::PathExpression { .. }
                | NodeKind::Member { .. }
                | NodeKind::Slice { .. }
                | NodeKind::Unary { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Mux { .. }
                | NodeKind::Cast { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::ListExpression { .. }
                | NodeKind::SelectExpression { .. }
                | NodeKind::DefaultExpression
        )
    }

    /// Whether this kind is a statement.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Assignment { .. }
                | NodeKind::MethodCallStatement { .. }
                | NodeKind::IfStatement { .. }
                | NodeKind::BlockStatement { .. }
                | NodeKind::ReturnStatement { .. }
                | NodeKind::ExitStatement
                | NodeKind::EmptyStatement
                | NodeKind::SwitchStatement { .. }
        )
    }

    /// Type parameters of a generic declaration (empty for other kinds).
    pub fn type_params(&self) -> &[NodeId] {
        match self {
            NodeKind::TypeExtern { type_params, .. }
            | NodeKind::Method { type_params, .. }
            | NodeKind::TypePackage { type_params, .. }
            | NodeKind::TypeControl { type_params, .. }
            | NodeKind::TypeParser { type_params, .. }
            | NodeKind::Function { type_params, .. }
            | NodeKind::Control { type_params, .. }
            | NodeKind::Parser { type_params, .. } => type_params,
            _ => &[],
        }
    }
}
