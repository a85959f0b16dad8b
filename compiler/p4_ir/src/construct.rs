//! Node construction helpers for the arena.
//!
//! Provides ergonomic methods for building IR by hand; passes use them when
//! synthesizing nodes, tests use them in place of a parser. Every helper
//! allocates a fresh node with [`Span::SYNTHESIZED`](crate::Span::SYNTHESIZED).

use num_bigint::BigInt;

use crate::node::{BinaryOp, Direction, IntType, NodeId, NodeKind, Path, UnaryOp};
use crate::Ir;

impl Ir {
    // === Type syntax ===

    /// `bit<width>`
    pub fn bits(&mut self, width: u32) -> NodeId {
        self.synthesize(NodeKind::TypeBits {
            width,
            signed: false,
        })
    }

    /// `int<width>`
    pub fn signed_bits(&mut self, width: u32) -> NodeId {
        self.synthesize(NodeKind::TypeBits {
            width,
            signed: true,
        })
    }

    pub fn bool_type(&mut self) -> NodeId {
        self.synthesize(NodeKind::TypeBool)
    }

    pub fn void_type(&mut self) -> NodeId {
        self.synthesize(NodeKind::TypeVoid)
    }

    pub fn string_type(&mut self) -> NodeId {
        self.synthesize(NodeKind::TypeString)
    }

    /// `int`
    pub fn int_type(&mut self) -> NodeId {
        self.synthesize(NodeKind::TypeInfInt)
    }

    pub fn type_name(&mut self, name: &str) -> NodeId {
        let path = Path::new(self.intern(name));
        self.synthesize(NodeKind::TypeName { path })
    }

    /// `base<args>`
    pub fn specialized(&mut self, base: &str, args: Vec<NodeId>) -> NodeId {
        let base = self.type_name(base);
        self.synthesize(NodeKind::TypeSpecialized { base, args })
    }

    pub fn tuple_type(&mut self, components: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::TypeTuple { components })
    }

    // === Type declarations ===

    pub fn type_var(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeVar { name })
    }

    pub fn field(&mut self, name: &str, ty: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::StructField { name, ty })
    }

    pub fn struct_decl(&mut self, name: &str, fields: Vec<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeStruct { name, fields })
    }

    pub fn header_decl(&mut self, name: &str, fields: Vec<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeHeader { name, fields })
    }

    pub fn header_union_decl(&mut self, name: &str, fields: Vec<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeHeaderUnion { name, fields })
    }

    pub fn enum_decl(&mut self, name: &str, members: &[&str]) -> NodeId {
        let name = self.intern(name);
        let members = members.iter().map(|m| self.declaration_id(m)).collect();
        self.synthesize(NodeKind::TypeEnum { name, members })
    }

    pub fn declaration_id(&mut self, name: &str) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::DeclarationId { name })
    }

    /// `typedef ty name;`
    pub fn typedef(&mut self, name: &str, ty: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeTypedef { name, ty })
    }

    pub fn extern_decl(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        methods: Vec<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeExtern {
            name,
            type_params,
            methods,
        })
    }

    pub fn method(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        return_type: NodeId,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Method {
            name,
            type_params,
            params,
            return_type,
        })
    }

    pub fn package_decl(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        ctor_params: Vec<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypePackage {
            name,
            type_params,
            ctor_params,
        })
    }

    pub fn control_type(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeControl {
            name,
            type_params,
            params,
        })
    }

    pub fn parser_type(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::TypeParser {
            name,
            type_params,
            params,
        })
    }

    pub fn match_kind(&mut self, members: &[&str]) -> NodeId {
        let members = members.iter().map(|m| self.declaration_id(m)).collect();
        self.synthesize(NodeKind::DeclMatchKind { members })
    }

    // === Declarations ===

    pub fn param(&mut self, direction: Direction, name: &str, ty: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Parameter {
            name,
            direction,
            ty,
            default_value: None,
        })
    }

    pub fn param_with_default(
        &mut self,
        direction: Direction,
        name: &str,
        ty: NodeId,
        default_value: NodeId,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Parameter {
            name,
            direction,
            ty,
            default_value: Some(default_value),
        })
    }

    /// `ty name = init;`
    pub fn var(&mut self, name: &str, ty: NodeId, init: Option<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::DeclVariable { name, ty, init })
    }

    /// `const ty name = init;`
    pub fn constant_decl(&mut self, name: &str, ty: NodeId, init: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::DeclConstant { name, ty, init })
    }

    /// `ty(args) name;`
    pub fn instance(&mut self, name: &str, ty: NodeId, args: Vec<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::DeclInstance { name, ty, args })
    }

    pub fn function(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        return_type: NodeId,
        body: NodeId,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Function {
            name,
            type_params,
            params,
            return_type,
            body,
        })
    }

    pub fn action(&mut self, name: &str, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Action { name, params, body })
    }

    pub fn control(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        locals: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Control {
            name,
            type_params,
            params,
            ctor_params: Vec::new(),
            locals,
            body,
        })
    }

    pub fn parser(
        &mut self,
        name: &str,
        type_params: Vec<NodeId>,
        params: Vec<NodeId>,
        locals: Vec<NodeId>,
        states: Vec<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Parser {
            name,
            type_params,
            params,
            ctor_params: Vec::new(),
            locals,
            states,
        })
    }

    /// `state name { components transition }`; `transition` names a state.
    pub fn state(&mut self, name: &str, components: Vec<NodeId>, transition: Option<&str>) -> NodeId {
        let transition = transition.map(|next| self.path(next));
        self.state_with(name, components, transition)
    }

    pub fn state_with(
        &mut self,
        name: &str,
        components: Vec<NodeId>,
        transition: Option<NodeId>,
    ) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::ParserState {
            name,
            components,
            transition,
        })
    }

    pub fn table(&mut self, name: &str, params: Vec<NodeId>, properties: Vec<NodeId>) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Table {
            name,
            params,
            properties,
        })
    }

    pub fn property(&mut self, name: &str, value: NodeId) -> NodeId {
        let name = self.intern(name);
        self.synthesize(NodeKind::Property {
            name,
            value,
            is_const: false,
        })
    }

    pub fn key(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::Key { elements })
    }

    /// `expr : match_kind`
    pub fn key_element(&mut self, expr: NodeId, match_kind: &str) -> NodeId {
        let match_kind = self.path(match_kind);
        self.synthesize(NodeKind::KeyElement { expr, match_kind })
    }

    pub fn action_list(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::ActionList { elements })
    }

    pub fn expression_value(&mut self, expr: NodeId) -> NodeId {
        self.synthesize(NodeKind::ExpressionValue { expr })
    }

    pub fn program(&mut self, decls: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::Program { decls })
    }

    // === Expressions ===

    /// Unsized integer literal.
    pub fn int(&mut self, value: i64) -> NodeId {
        self.int_lit(BigInt::from(value), IntType::Infinite)
    }

    /// `width w value`
    pub fn bits_lit(&mut self, width: u32, value: i64) -> NodeId {
        self.int_lit(BigInt::from(value), IntType::bits(width))
    }

    pub fn int_lit(&mut self, value: BigInt, ty: IntType) -> NodeId {
        self.synthesize(NodeKind::Constant {
            value,
            ty,
            base: 10,
        })
    }

    pub fn bool_lit(&mut self, value: bool) -> NodeId {
        self.synthesize(NodeKind::BoolLiteral { value })
    }

    pub fn string_lit(&mut self, value: &str) -> NodeId {
        let value = self.intern(value);
        self.synthesize(NodeKind::StringLiteral { value })
    }

    pub fn path(&mut self, name: &str) -> NodeId {
        let path = Path::new(self.intern(name));
        self.synthesize(NodeKind::PathExpression { path })
    }

    /// `.name`
    pub fn absolute_path(&mut self, name: &str) -> NodeId {
        let path = Path {
            name: self.intern(name),
            absolute: true,
        };
        self.synthesize(NodeKind::PathExpression { path })
    }

    pub fn member(&mut self, expr: NodeId, member: &str) -> NodeId {
        let member = self.intern(member);
        self.synthesize(NodeKind::Member { expr, member })
    }

    /// `expr[high:low]`
    pub fn slice(&mut self, expr: NodeId, high: u32, low: u32) -> NodeId {
        let high = self.int(i64::from(high));
        let low = self.int(i64::from(low));
        self.synthesize(NodeKind::Slice { expr, high, low })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.synthesize(NodeKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.synthesize(NodeKind::Binary { op, left, right })
    }

    pub fn mux(&mut self, cond: NodeId, if_true: NodeId, if_false: NodeId) -> NodeId {
        self.synthesize(NodeKind::Mux {
            cond,
            if_true,
            if_false,
        })
    }

    pub fn cast(&mut self, ty: NodeId, expr: NodeId) -> NodeId {
        self.synthesize(NodeKind::Cast { ty, expr })
    }

    pub fn call(&mut self, method: NodeId, args: Vec<NodeId>) -> NodeId {
        self.call_generic(method, Vec::new(), args)
    }

    pub fn call_generic(
        &mut self,
        method: NodeId,
        type_args: Vec<NodeId>,
        args: Vec<NodeId>,
    ) -> NodeId {
        self.synthesize(NodeKind::MethodCall {
            method,
            type_args,
            args,
        })
    }

    /// `target.apply(args)`
    pub fn apply_call(&mut self, target: &str, args: Vec<NodeId>) -> NodeId {
        let target = self.path(target);
        let method = self.member(target, "apply");
        self.call(method, args)
    }

    pub fn list(&mut self, components: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::ListExpression { components })
    }

    /// `select(exprs) { cases }`
    pub fn select(&mut self, exprs: Vec<NodeId>, cases: Vec<NodeId>) -> NodeId {
        let select = self.list(exprs);
        self.synthesize(NodeKind::SelectExpression { select, cases })
    }

    /// `keyset: state`
    pub fn select_case(&mut self, keyset: NodeId, state: &str) -> NodeId {
        let state = self.path(state);
        self.synthesize(NodeKind::SelectCase { keyset, state })
    }

    pub fn default_expr(&mut self) -> NodeId {
        self.synthesize(NodeKind::DefaultExpression)
    }

    // === Statements ===

    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.synthesize(NodeKind::Assignment { left, right })
    }

    pub fn call_stmt(&mut self, call: NodeId) -> NodeId {
        self.synthesize(NodeKind::MethodCallStatement { call })
    }

    pub fn if_stmt(&mut self, cond: NodeId, if_true: NodeId, if_false: Option<NodeId>) -> NodeId {
        self.synthesize(NodeKind::IfStatement {
            cond,
            if_true,
            if_false,
        })
    }

    pub fn block(&mut self, components: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::BlockStatement { components })
    }

    pub fn ret(&mut self, expr: Option<NodeId>) -> NodeId {
        self.synthesize(NodeKind::ReturnStatement { expr })
    }

    pub fn exit(&mut self) -> NodeId {
        self.synthesize(NodeKind::ExitStatement)
    }

    pub fn empty(&mut self) -> NodeId {
        self.synthesize(NodeKind::EmptyStatement)
    }

    pub fn switch(&mut self, expr: NodeId, cases: Vec<NodeId>) -> NodeId {
        self.synthesize(NodeKind::SwitchStatement { expr, cases })
    }

    pub fn switch_case(&mut self, label: NodeId, stmt: Option<NodeId>) -> NodeId {
        self.synthesize(NodeKind::SwitchCase { label, stmt })
    }
}
