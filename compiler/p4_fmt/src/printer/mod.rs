//! The P4 printer.
//!
//! Output is a pure function of the tree: identical IR prints byte-identical
//! text. Layout is fixed (four-space indentation, one declaration or
//! statement per line) so the output can serve as a golden file.
//!
//! Statement and expression printers write at the current cursor and never
//! end with a newline; declaration printers emit whole lines.

mod expr;
mod stmt;

use p4_ir::{Ir, Name, NodeId, NodeKind};

use crate::emitter::Emitter;

/// Printer over one IR arena.
pub struct Printer<'a, E: Emitter> {
    ir: &'a Ir,
    out: E,
    level: usize,
}

impl<'a, E: Emitter> Printer<'a, E> {
    pub fn new(ir: &'a Ir, out: E) -> Self {
        Printer { ir, out, level: 0 }
    }

    pub fn into_emitter(self) -> E {
        self.out
    }

    fn name(&self, name: Name) -> &'static str {
        self.ir.name_str(name)
    }

    fn emit(&mut self, text: &str) {
        self.out.emit(text);
    }

    fn indent(&mut self) {
        self.out.emit_indent(self.level);
    }

    fn newline(&mut self) {
        self.out.emit_newline();
    }

    /// Print any node: whole lines for programs, declarations and
    /// statements; inline text for expressions and types.
    pub fn print(&mut self, id: NodeId) {
        let kind = self.ir.kind(id);
        if kind.is_expression() {
            self.expr(id);
        } else if is_type_syntax(kind) {
            self.type_syntax(id);
        } else {
            self.component(id);
        }
    }

    /// A declaration or statement as whole lines.
    fn component(&mut self, id: NodeId) {
        if self.ir.kind(id).is_statement() {
            self.indent();
            self.stmt(id);
            self.newline();
        } else {
            self.decl(id);
        }
    }

    fn decl(&mut self, id: NodeId) {
        let ir = self.ir;
        match ir.kind(id) {
            NodeKind::Program { decls } => {
                for &decl in decls {
                    self.component(decl);
                }
            }
            NodeKind::TypeStruct { name, fields }
            | NodeKind::TypeHeader { name, fields }
            | NodeKind::TypeHeaderUnion { name, fields } => {
                let keyword = match ir.kind(id) {
                    NodeKind::TypeHeader { .. } => "header",
                    NodeKind::TypeHeaderUnion { .. } => "header_union",
                    _ => "struct",
                };
                self.indent();
                self.emit(keyword);
                self.emit(" ");
                self.emit(self.name(*name));
                self.emit(" {");
                self.newline();
                self.level += 1;
                for &field in fields {
                    self.decl(field);
                }
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::StructField { name, ty } => {
                self.indent();
                self.type_syntax(*ty);
                self.emit(" ");
                self.emit(self.name(*name));
                self.emit(";");
                self.newline();
            }
            NodeKind::TypeEnum { name, members } => {
                self.indent();
                self.emit("enum ");
                self.emit(self.name(*name));
                self.emit(" ");
                self.member_list(members);
                self.newline();
            }
            NodeKind::DeclMatchKind { members } => {
                self.indent();
                self.emit("match_kind ");
                self.member_list(members);
                self.newline();
            }
            NodeKind::TypeTypedef { name, ty } => {
                self.indent();
                self.emit("typedef ");
                self.type_syntax(*ty);
                self.emit(" ");
                self.emit(self.name(*name));
                self.emit(";");
                self.newline();
            }
            NodeKind::TypeExtern {
                name,
                type_params,
                methods,
            } => {
                self.indent();
                self.emit("extern ");
                self.emit(self.name(*name));
                self.type_params(type_params);
                self.emit(" {");
                self.newline();
                self.level += 1;
                for &method in methods {
                    self.method(method, *name);
                }
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::Method { .. } => self.method(id, Name::EMPTY),
            NodeKind::TypePackage {
                name,
                type_params,
                ctor_params,
            } => self.prototype("package", *name, type_params, ctor_params),
            NodeKind::TypeControl {
                name,
                type_params,
                params,
            } => self.prototype("control", *name, type_params, params),
            NodeKind::TypeParser {
                name,
                type_params,
                params,
            } => self.prototype("parser", *name, type_params, params),
            NodeKind::DeclVariable { name, ty, init } => {
                self.indent();
                self.type_syntax(*ty);
                self.emit(" ");
                self.emit(self.name(*name));
                if let Some(init) = init {
                    self.emit(" = ");
                    self.expr(*init);
                }
                self.emit(";");
                self.newline();
            }
            NodeKind::DeclConstant { name, ty, init } => {
                self.indent();
                self.emit("const ");
                self.type_syntax(*ty);
                self.emit(" ");
                self.emit(self.name(*name));
                self.emit(" = ");
                self.expr(*init);
                self.emit(";");
                self.newline();
            }
            NodeKind::DeclInstance { name, ty, args } => {
                self.indent();
                self.type_syntax(*ty);
                self.args(args);
                self.emit(" ");
                self.emit(self.name(*name));
                self.emit(";");
                self.newline();
            }
            NodeKind::Function {
                name,
                type_params,
                params,
                return_type,
                body,
            } => {
                self.indent();
                self.type_syntax(*return_type);
                self.emit(" ");
                self.emit(self.name(*name));
                self.type_params(type_params);
                self.params(params);
                self.emit(" ");
                self.stmt(*body);
                self.newline();
            }
            NodeKind::Action { name, params, body } => {
                self.indent();
                self.emit("action ");
                self.emit(self.name(*name));
                self.params(params);
                self.emit(" ");
                self.stmt(*body);
                self.newline();
            }
            NodeKind::Control {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                body,
            } => {
                self.block_header("control", *name, type_params, params, ctor_params);
                self.level += 1;
                for &local in locals {
                    self.component(local);
                }
                self.indent();
                self.emit("apply ");
                self.stmt(*body);
                self.newline();
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::Parser {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                states,
            } => {
                self.block_header("parser", *name, type_params, params, ctor_params);
                self.level += 1;
                for &local in locals {
                    self.component(local);
                }
                for &state in states {
                    self.decl(state);
                }
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::ParserState {
                name,
                components,
                transition,
            } => {
                self.indent();
                self.emit("state ");
                self.emit(self.name(*name));
                self.emit(" {");
                self.newline();
                self.level += 1;
                for &component in components {
                    self.component(component);
                }
                if let Some(transition) = transition {
                    self.indent();
                    self.emit("transition ");
                    self.expr(*transition);
                    if !matches!(ir.kind(*transition), NodeKind::SelectExpression { .. }) {
                        self.emit(";");
                    }
                    self.newline();
                }
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::Table {
                name,
                params,
                properties,
            } => {
                self.indent();
                self.emit("table ");
                self.emit(self.name(*name));
                if !params.is_empty() {
                    self.params(params);
                }
                self.emit(" {");
                self.newline();
                self.level += 1;
                for &property in properties {
                    self.decl(property);
                }
                self.level -= 1;
                self.closing_brace();
            }
            NodeKind::Property {
                name,
                value,
                is_const,
            } => self.property(*name, *value, *is_const),
            NodeKind::Parameter { .. } => {
                self.indent();
                self.param(id);
                self.newline();
            }
            kind => {
                self.indent();
                if kind.is_expression() {
                    self.expr(id);
                } else if is_type_syntax(kind) {
                    self.type_syntax(id);
                } else if let Some(name) = kind.declared_name() {
                    self.emit(self.name(name));
                } else {
                    self.emit(kind.tag());
                }
                self.newline();
            }
        }
    }

    fn closing_brace(&mut self) {
        self.indent();
        self.emit("}");
        self.newline();
    }

    /// `{ A, B, C }`
    fn member_list(&mut self, members: &[NodeId]) {
        self.emit("{ ");
        for (i, &member) in members.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.emit(self.ir.decl_name_str(member));
        }
        self.emit(" }");
    }

    /// Extern method; a method named after its extern is a constructor.
    fn method(&mut self, id: NodeId, extern_name: Name) {
        let NodeKind::Method {
            name,
            type_params,
            params,
            return_type,
        } = self.ir.kind(id)
        else {
            return;
        };
        self.indent();
        if *name != extern_name {
            self.type_syntax(*return_type);
            self.emit(" ");
        }
        self.emit(self.name(*name));
        self.type_params(type_params);
        self.params(params);
        self.emit(";");
        self.newline();
    }

    fn prototype(&mut self, keyword: &str, name: Name, type_params: &[NodeId], params: &[NodeId]) {
        self.indent();
        self.emit(keyword);
        self.emit(" ");
        self.emit(self.name(name));
        self.type_params(type_params);
        self.params(params);
        self.emit(";");
        self.newline();
    }

    fn block_header(
        &mut self,
        keyword: &str,
        name: Name,
        type_params: &[NodeId],
        params: &[NodeId],
        ctor_params: &[NodeId],
    ) {
        self.indent();
        self.emit(keyword);
        self.emit(" ");
        self.emit(self.name(name));
        self.type_params(type_params);
        self.params(params);
        if !ctor_params.is_empty() {
            self.params(ctor_params);
        }
        self.emit(" {");
        self.newline();
    }

    fn property(&mut self, name: Name, value: NodeId, is_const: bool) {
        let ir = self.ir;
        self.indent();
        if is_const {
            self.emit("const ");
        }
        self.emit(self.name(name));
        self.emit(" = ");
        match ir.kind(value) {
            NodeKind::Key { elements } => {
                self.emit("{");
                self.newline();
                self.level += 1;
                for &element in elements {
                    if let NodeKind::KeyElement { expr, match_kind } = ir.kind(element) {
                        self.indent();
                        self.expr(*expr);
                        self.emit(": ");
                        self.expr(*match_kind);
                        self.emit(";");
                        self.newline();
                    }
                }
                self.level -= 1;
                self.indent();
                self.emit("}");
            }
            NodeKind::ActionList { elements } => {
                self.emit("{");
                self.newline();
                self.level += 1;
                for &element in elements {
                    self.indent();
                    self.expr(element);
                    self.emit(";");
                    self.newline();
                }
                self.level -= 1;
                self.indent();
                self.emit("}");
            }
            NodeKind::ExpressionValue { expr } => {
                self.expr(*expr);
                self.emit(";");
            }
            _ => {
                self.expr(value);
                self.emit(";");
            }
        }
        self.newline();
    }

    fn type_params(&mut self, type_params: &[NodeId]) {
        if type_params.is_empty() {
            return;
        }
        self.emit("<");
        for (i, &tp) in type_params.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.emit(self.ir.decl_name_str(tp));
        }
        self.emit(">");
    }

    fn params(&mut self, params: &[NodeId]) {
        self.emit("(");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.param(param);
        }
        self.emit(")");
    }

    fn param(&mut self, id: NodeId) {
        let NodeKind::Parameter {
            name,
            direction,
            ty,
            default_value,
        } = self.ir.kind(id)
        else {
            return;
        };
        let keyword = direction.keyword();
        if !keyword.is_empty() {
            self.emit(keyword);
            self.emit(" ");
        }
        self.type_syntax(*ty);
        self.emit(" ");
        self.emit(self.name(*name));
        if let Some(default_value) = default_value {
            self.emit(" = ");
            self.expr(*default_value);
        }
    }
}

/// Type syntax kinds (printed inline).
fn is_type_syntax(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::TypeBits { .. }
            | NodeKind::TypeBool
            | NodeKind::TypeVoid
            | NodeKind::TypeString
            | NodeKind::TypeInfInt
            | NodeKind::TypeName { .. }
            | NodeKind::TypeSpecialized { .. }
            | NodeKind::TypeTuple { .. }
    )
}

#[cfg(test)]
mod tests;
