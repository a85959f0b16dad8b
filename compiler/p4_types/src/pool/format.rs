//! Human-readable rendering of pool types for diagnostics.

use std::fmt::Write;

use p4_ir::StringInterner;

use super::TypePool;
use crate::ty::Type;
use crate::TypeId;

impl TypePool {
    /// Render `ty` in P4 surface syntax where one exists.
    pub fn display(&self, ty: TypeId, interner: &StringInterner) -> String {
        let mut out = String::new();
        self.write_type(ty, interner, &mut out);
        out
    }

    fn write_list(&self, tys: &[TypeId], interner: &StringInterner, out: &mut String) {
        for (i, &t) in tys.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(t, interner, out);
        }
    }

    fn write_type(&self, ty: TypeId, interner: &StringInterner, out: &mut String) {
        if let Some(name) = ty.name() {
            out.push_str(name);
            return;
        }
        match self.get(ty) {
            Type::Bits { width, signed } => {
                let keyword = if *signed { "int" } else { "bit" };
                let _ = write!(out, "{keyword}<{width}>");
            }
            Type::Tuple(components) => {
                out.push_str("tuple<");
                self.write_list(components, interner, out);
                out.push('>');
            }
            Type::Specialized { base, args } => {
                self.write_type(*base, interner, out);
                out.push('<');
                self.write_list(args, interner, out);
                out.push('>');
            }
            Type::Function(f) => {
                out.push('(');
                for (i, param) in f.params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let direction = param.direction.keyword();
                    if !direction.is_empty() {
                        out.push_str(direction);
                        out.push(' ');
                    }
                    self.write_type(param.ty, interner, out);
                }
                out.push_str(") -> ");
                self.write_type(f.ret, interner, out);
            }
            Type::TableApplyResult { .. } => out.push_str("apply_result"),
            Type::ActionEnum { .. } => out.push_str("action_enum"),
            Type::TypeOf(inner) => {
                out.push_str("type ");
                self.write_type(*inner, interner, out);
            }
            other => match other.nominal_name() {
                Some(name) => out.push_str(interner.lookup(name)),
                None => out.push_str("<type>"),
            },
        }
    }
}
