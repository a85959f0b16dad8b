//! Structural checks on a freshly parsed program.
//!
//! These are the rules the grammar accepts but the language forbids. The
//! pass only reports; it never changes the IR.

use p4_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use p4_ir::{inspect, Direction, Inspector, Ir, NodeId, NodeKind, Visit};
use rustc_hash::FxHashMap;

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};

pub struct ValidateParsedProgram;

impl Pass for ValidateParsedProgram {
    fn name(&self) -> &str {
        "ValidateParsedProgram"
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        validate(&ctx.ir, root, &mut ctx.diagnostics);
        Ok(root)
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn validate(ir: &Ir, root: NodeId, diags: &mut DiagnosticQueue) {
    inspect(&mut Validator { diags }, ir, root);
}

struct Validator<'a> {
    diags: &'a mut DiagnosticQueue,
}

impl Validator<'_> {
    fn error(&mut self, ir: &Ir, code: ErrorCode, id: NodeId, message: String) {
        self.diags.push(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(ir.span(id), "here"),
        );
    }

    fn check_width(&mut self, ir: &Ir, id: NodeId, width: u32, signed: bool) {
        let minimum = if signed { 2 } else { 1 };
        if width < minimum {
            let keyword = if signed { "int" } else { "bit" };
            self.error(
                ir,
                ErrorCode::E0001,
                id,
                format!("`{keyword}<{width}>` is not a valid type; the width must be at least {minimum}"),
            );
        }
    }

    fn check_ctor_params(&mut self, ir: &Ir, params: &[NodeId]) {
        for &param in params {
            if let NodeKind::Parameter {
                name, direction, ..
            } = ir.kind(param)
            {
                if *direction != Direction::None {
                    self.error(
                        ir,
                        ErrorCode::E0002,
                        param,
                        format!(
                            "constructor parameter `{}` cannot have a direction",
                            ir.name_str(*name)
                        ),
                    );
                }
            }
        }
    }

    fn check_parser_states(&mut self, ir: &Ir, parser: NodeId, states: &[NodeId]) {
        let mut has_start = false;
        for &state in states {
            match ir.decl_name_str(state) {
                "start" => has_start = true,
                name @ ("accept" | "reject") => self.error(
                    ir,
                    ErrorCode::E0004,
                    state,
                    format!("state `{name}` is built in and cannot be declared"),
                ),
                _ => {}
            }
        }
        if !has_start {
            self.error(
                ir,
                ErrorCode::E0003,
                parser,
                format!("parser `{}` has no `start` state", ir.decl_name_str(parser)),
            );
        }
    }

    fn check_switch(&mut self, ir: &Ir, cases: &[NodeId]) {
        let Some((_, init)) = cases.split_last() else {
            return;
        };
        for &case in init {
            if let NodeKind::SwitchCase { label, .. } = ir.kind(case) {
                if matches!(ir.kind(*label), NodeKind::DefaultExpression) {
                    self.error(
                        ir,
                        ErrorCode::E0005,
                        case,
                        "`default` must be the last switch label".to_owned(),
                    );
                }
            }
        }
    }

    fn check_action_params(&mut self, ir: &Ir, params: &[NodeId]) {
        let mut seen_directionless = false;
        for &param in params {
            let NodeKind::Parameter {
                name, direction, ..
            } = ir.kind(param)
            else {
                continue;
            };
            if *direction == Direction::None {
                seen_directionless = true;
            } else if seen_directionless {
                self.error(
                    ir,
                    ErrorCode::E0006,
                    param,
                    format!(
                        "parameter `{}` has a direction but follows a directionless parameter",
                        ir.name_str(*name)
                    ),
                );
            }
        }
    }

    fn check_table_properties(&mut self, ir: &Ir, properties: &[NodeId]) {
        let mut seen = FxHashMap::default();
        for &property in properties {
            let NodeKind::Property { name, .. } = ir.kind(property) else {
                continue;
            };
            if let Some(&first) = seen.get(name) {
                self.diags.push(
                    Diagnostic::error(ErrorCode::E0007)
                        .with_message(format!(
                            "table property `{}` is specified more than once",
                            ir.name_str(*name)
                        ))
                        .with_label(ir.span(property), "duplicate property")
                        .with_secondary_label(ir.span(first), "first specified here"),
                );
            } else {
                seen.insert(*name, property);
            }
        }
    }
}

impl Inspector for Validator<'_> {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        match ir.kind(id) {
            NodeKind::TypeBits { width, signed } => self.check_width(ir, id, *width, *signed),
            NodeKind::Control { ctor_params, .. } | NodeKind::TypePackage { ctor_params, .. } => {
                self.check_ctor_params(ir, ctor_params);
            }
            NodeKind::Parser {
                ctor_params,
                states,
                ..
            } => {
                self.check_ctor_params(ir, ctor_params);
                self.check_parser_states(ir, id, states);
            }
            NodeKind::TypeExtern { name, methods, .. } => {
                for &method in methods {
                    if let NodeKind::Method {
                        name: method_name,
                        params,
                        ..
                    } = ir.kind(method)
                    {
                        if method_name == name {
                            self.check_ctor_params(ir, params);
                        }
                    }
                }
            }
            NodeKind::SwitchStatement { cases, .. } => self.check_switch(ir, cases),
            NodeKind::Action { params, .. } => self.check_action_params(ir, params),
            NodeKind::Table { properties, .. } => self.check_table_properties(ir, properties),
            _ => {}
        }
        Visit::Continue
    }
}
