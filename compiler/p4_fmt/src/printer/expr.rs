//! Expressions and type syntax.

use p4_ir::{BigInt, IntType, NodeId, NodeKind, Path};

use super::Printer;
use crate::emitter::Emitter;

/// Binding strength of unary operators and casts.
const PREFIX: u8 = 11;
/// Binding strength of atoms and postfix forms (member, slice, call).
const POSTFIX: u8 = 12;

fn precedence(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Mux { .. } => 0,
        NodeKind::Binary { op, .. } => op.precedence(),
        NodeKind::Unary { .. } | NodeKind::Cast { .. } => PREFIX,
        _ => POSTFIX,
    }
}

/// Source text of an integer literal: `42`, `8w7`, `-8s5`, `16w0x1f`.
pub(crate) fn constant_text(value: &BigInt, ty: IntType, base: u32) -> String {
    let negative = value < &BigInt::from(0);
    let magnitude = value.magnitude();
    let digits = match base {
        16 => format!("0x{}", magnitude.to_str_radix(16)),
        8 => format!("0o{}", magnitude.to_str_radix(8)),
        2 => format!("0b{}", magnitude.to_str_radix(2)),
        _ => magnitude.to_string(),
    };
    let prefix = match ty {
        IntType::Infinite => String::new(),
        IntType::Bits { width, signed } => format!("{width}{}", if signed { 's' } else { 'w' }),
    };
    format!("{}{prefix}{digits}", if negative { "-" } else { "" })
}

impl<E: Emitter> Printer<'_, E> {
    pub(super) fn expr(&mut self, id: NodeId) {
        self.expr_prec(id, 0);
    }

    /// Print `id`, parenthesized when it binds looser than `min`.
    fn expr_prec(&mut self, id: NodeId, min: u8) {
        let ir = self.ir;
        let kind = ir.kind(id);
        let parens = precedence(kind) < min;
        if parens {
            self.emit("(");
        }
        match kind {
            NodeKind::Constant { value, ty, base } => {
                self.emit(&constant_text(value, *ty, *base));
            }
            NodeKind::BoolLiteral { value } => self.emit(if *value { "true" } else { "false" }),
            NodeKind::StringLiteral { value } => {
                self.emit("\"");
                self.emit(self.name(*value));
                self.emit("\"");
            }
            NodeKind::PathExpression { path } => self.path(*path),
            NodeKind::Member { expr, member } => {
                self.expr_prec(*expr, POSTFIX);
                self.emit(".");
                self.emit(self.name(*member));
            }
            NodeKind::Slice { expr, high, low } => {
                self.expr_prec(*expr, POSTFIX);
                self.emit("[");
                self.expr(*high);
                self.emit(":");
                self.expr(*low);
                self.emit("]");
            }
            NodeKind::Unary { op, operand } => {
                self.emit(op.symbol());
                self.expr_prec(*operand, PREFIX);
            }
            NodeKind::Binary { op, left, right } => {
                let prec = op.precedence();
                self.expr_prec(*left, prec);
                self.emit(" ");
                self.emit(op.symbol());
                self.emit(" ");
                self.expr_prec(*right, prec + 1);
            }
            NodeKind::Mux {
                cond,
                if_true,
                if_false,
            } => {
                self.expr_prec(*cond, 1);
                self.emit(" ? ");
                self.expr(*if_true);
                self.emit(" : ");
                self.expr(*if_false);
            }
            NodeKind::Cast { ty, expr } => {
                self.emit("(");
                self.type_syntax(*ty);
                self.emit(")");
                self.expr_prec(*expr, PREFIX);
            }
            NodeKind::MethodCall {
                method,
                type_args,
                args,
            } => {
                self.expr_prec(*method, POSTFIX);
                if !type_args.is_empty() {
                    self.type_list(type_args);
                }
                self.args(args);
            }
            NodeKind::ListExpression { components } => {
                self.emit("{");
                self.comma_separated(components);
                self.emit("}");
            }
            NodeKind::SelectExpression { select, cases } => {
                self.emit("select(");
                match ir.kind(*select) {
                    NodeKind::ListExpression { components } => self.comma_separated(components),
                    _ => self.expr(*select),
                }
                self.emit(") {");
                self.newline();
                self.level += 1;
                for &case in cases {
                    self.select_case(case);
                }
                self.level -= 1;
                self.indent();
                self.emit("}");
            }
            NodeKind::SelectCase { .. } => self.select_case(id),
            NodeKind::DefaultExpression => self.emit("default"),
            _ => self.type_syntax(id),
        }
        if parens {
            self.emit(")");
        }
    }

    fn select_case(&mut self, id: NodeId) {
        let ir = self.ir;
        let NodeKind::SelectCase { keyset, state } = ir.kind(id) else {
            return;
        };
        self.indent();
        match ir.kind(*keyset) {
            NodeKind::ListExpression { components } => {
                self.emit("(");
                self.comma_separated(components);
                self.emit(")");
            }
            _ => self.expr(*keyset),
        }
        self.emit(": ");
        self.expr(*state);
        self.emit(";");
        self.newline();
    }

    fn path(&mut self, path: Path) {
        if path.absolute {
            self.emit(".");
        }
        self.emit(self.name(path.name));
    }

    fn comma_separated(&mut self, exprs: &[NodeId]) {
        for (i, &expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.expr(expr);
        }
    }

    /// `(a, b)`
    pub(super) fn args(&mut self, args: &[NodeId]) {
        self.emit("(");
        self.comma_separated(args);
        self.emit(")");
    }

    /// `<T, U>`
    fn type_list(&mut self, types: &[NodeId]) {
        self.emit("<");
        for (i, &ty) in types.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.type_syntax(ty);
        }
        self.emit(">");
    }

    pub(super) fn type_syntax(&mut self, id: NodeId) {
        let ir = self.ir;
        match ir.kind(id) {
            NodeKind::TypeBits { width, signed } => {
                self.emit(if *signed { "int<" } else { "bit<" });
                self.emit(&width.to_string());
                self.emit(">");
            }
            NodeKind::TypeBool => self.emit("bool"),
            NodeKind::TypeVoid => self.emit("void"),
            NodeKind::TypeString => self.emit("string"),
            NodeKind::TypeInfInt => self.emit("int"),
            NodeKind::TypeName { path } => self.path(*path),
            NodeKind::TypeSpecialized { base, args } => {
                self.type_syntax(*base);
                self.type_list(args);
            }
            NodeKind::TypeTuple { components } => {
                self.emit("tuple");
                self.type_list(components);
            }
            kind if kind.is_expression() => self.expr(id),
            kind => match kind.declared_name() {
                Some(name) => self.emit(self.name(name)),
                None => self.emit(kind.tag()),
            },
        }
    }
}
