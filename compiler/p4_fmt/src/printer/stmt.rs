//! Statements.

use p4_ir::{NodeId, NodeKind};

use super::Printer;
use crate::emitter::Emitter;

impl<E: Emitter> Printer<'_, E> {
    /// Print a statement at the cursor, without the trailing newline.
    pub(super) fn stmt(&mut self, id: NodeId) {
        let ir = self.ir;
        match ir.kind(id) {
            NodeKind::Assignment { left, right } => {
                self.expr(*left);
                self.emit(" = ");
                self.expr(*right);
                self.emit(";");
            }
            NodeKind::MethodCallStatement { call } => {
                self.expr(*call);
                self.emit(";");
            }
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            } => {
                self.emit("if (");
                self.expr(*cond);
                self.emit(") ");
                self.stmt(*if_true);
                if let Some(if_false) = if_false {
                    if matches!(ir.kind(*if_true), NodeKind::BlockStatement { .. }) {
                        self.emit(" ");
                    } else {
                        self.newline();
                        self.indent();
                    }
                    self.emit("else ");
                    self.stmt(*if_false);
                }
            }
            NodeKind::BlockStatement { components } => {
                self.emit("{");
                self.newline();
                self.level += 1;
                for &component in components {
                    self.component(component);
                }
                self.level -= 1;
                self.indent();
                self.emit("}");
            }
            NodeKind::ReturnStatement { expr } => match expr {
                Some(expr) => {
                    self.emit("return ");
                    self.expr(*expr);
                    self.emit(";");
                }
                None => self.emit("return;"),
            },
            NodeKind::ExitStatement => self.emit("exit;"),
            NodeKind::EmptyStatement => self.emit(";"),
            NodeKind::SwitchStatement { expr, cases } => {
                self.emit("switch (");
                self.expr(*expr);
                self.emit(") {");
                self.newline();
                self.level += 1;
                for &case in cases {
                    self.switch_case(case);
                }
                self.level -= 1;
                self.indent();
                self.emit("}");
            }
            NodeKind::SwitchCase { .. } => self.switch_case(id),
            _ => self.expr(id),
        }
    }

    fn switch_case(&mut self, id: NodeId) {
        let NodeKind::SwitchCase { label, stmt } = self.ir.kind(id) else {
            return;
        };
        self.indent();
        self.expr(*label);
        self.emit(":");
        if let Some(stmt) = stmt {
            self.emit(" ");
            self.stmt(*stmt);
        }
        self.newline();
    }
}
