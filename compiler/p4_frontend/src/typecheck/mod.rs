//! Type checking and type inference.
//!
//! The checker walks the tree bottom-up. Declarations get their types from
//! their annotations; expressions synthesize types from their operands and
//! are checked against what their context expects. Where an `int` value
//! meets a bit-vector, a `Cast` is inserted.
//!
//! # Modes
//!
//! - [`CheckMode::Learn`]: report errors and insert casts. When casts were
//!   inserted the pass re-resolves the new tree and runs again in update
//!   mode, so the type map always describes the tree the pass returns.
//! - [`CheckMode::Update`]: the tree is assumed well typed and is never
//!   changed; the map is rebuilt from scratch. A cast that would be needed
//!   is an internal error.
//!
//! # Layout
//!
//! - `syntax`: types of type syntax and of declarations
//! - `expr`: operators, members, casts, slices, coercion
//! - `calls`: method calls, generic inference, instantiation
//! - `stmt`: statements, declarations, tables and parsers

mod calls;
mod expr;
mod stmt;
mod syntax;

use p4_diagnostic::{type_mismatch, Diagnostic, DiagnosticQueue, ErrorCode};
use p4_ir::{transform, Ir, NodeId, NodeKind, Rewrite, Transform};
use p4_types::{TypeId, TypeMap, TypePool};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::context::{FrontendContext, TypeMapSlot};
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::ReferenceMap;
use crate::resolve::{resolve, ResolveOptions};

/// What the type checker may do to the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CheckMode {
    /// Report errors and insert implicit casts.
    Learn,
    /// Repopulate the type map of a well-typed tree.
    Update,
}

/// The type checker pass, writing one of the two type maps.
pub struct TypeChecker {
    mode: CheckMode,
    slot: TypeMapSlot,
    resolve: ResolveOptions,
}

impl TypeChecker {
    /// Learn mode; `forward_refs` configures the re-resolution after casts
    /// were inserted.
    pub fn learn(slot: TypeMapSlot, forward_refs: bool) -> Self {
        TypeChecker {
            mode: CheckMode::Learn,
            slot,
            resolve: ResolveOptions {
                forward_refs,
                check_shadowing: false,
            },
        }
    }

    pub fn update(slot: TypeMapSlot) -> Self {
        TypeChecker {
            mode: CheckMode::Update,
            slot,
            resolve: ResolveOptions::default(),
        }
    }
}

impl Pass for TypeChecker {
    fn name(&self) -> &str {
        match self.mode {
            CheckMode::Learn => "TypeChecker(learn)",
            CheckMode::Update => "TypeChecker(update)",
        }
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn populates(&self) -> Analyses {
        match self.mode {
            CheckMode::Learn => Analyses::REFERENCES | self.slot.analysis(),
            CheckMode::Update => self.slot.analysis(),
        }
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let errors_before = ctx.reported_errors();
        let new_root = check(
            &mut ctx.ir,
            root,
            &ctx.ref_map,
            ctx.type_maps.get_mut(self.slot),
            &mut ctx.diagnostics,
            self.mode,
        );
        if new_root == root {
            return Ok(root);
        }

        resolve(
            &ctx.ir,
            new_root,
            &mut ctx.ref_map,
            &mut ctx.diagnostics,
            self.resolve,
        );
        if ctx.reported_errors() > errors_before {
            return Ok(new_root);
        }
        let again = check(
            &mut ctx.ir,
            new_root,
            &ctx.ref_map,
            ctx.type_maps.get_mut(self.slot),
            &mut ctx.diagnostics,
            CheckMode::Update,
        );
        if again != new_root {
            return Err(PassError::Internal {
                pass: self.name().to_owned(),
                message: "update run changed the tree".to_owned(),
            });
        }
        Ok(new_root)
    }
}

/// Check the tree rooted at `root`, rebuilding `types` from scratch.
///
/// Returns the new root; in update mode this is always `root`.
#[tracing::instrument(level = "debug", skip_all, fields(mode = ?mode))]
pub fn check(
    ir: &mut Ir,
    root: NodeId,
    refs: &ReferenceMap,
    types: &mut TypeMap,
    diags: &mut DiagnosticQueue,
    mode: CheckMode,
) -> NodeId {
    types.clear();
    let mut checker = Checker {
        refs,
        types,
        diags,
        mode,
        decl_types: FxHashMap::default(),
        syntax_types: FxHashMap::default(),
        in_progress: FxHashSet::default(),
        callables: Vec::new(),
        action_lists: 0,
        casts: 0,
    };
    let new_root = transform(&mut checker, ir, root);
    debug!(
        typed = checker.types.len(),
        casts = checker.casts,
        "type check done"
    );
    new_root
}

pub(crate) struct Checker<'a> {
    refs: &'a ReferenceMap,
    types: &'a mut TypeMap,
    diags: &'a mut DiagnosticQueue,
    mode: CheckMode,
    /// Types of declarations, keyed by the id the reference map knows.
    decl_types: FxHashMap<NodeId, TypeId>,
    syntax_types: FxHashMap<NodeId, TypeId>,
    /// Declarations whose type is being computed; guards cyclic types.
    in_progress: FxHashSet<NodeId>,
    /// Enclosing functions, actions, controls and parsers, innermost last.
    callables: Vec<NodeId>,
    /// Nesting depth of action lists.
    action_lists: usize,
    casts: usize,
}

impl Checker<'_> {
    fn pool(&mut self) -> &mut TypePool {
        self.types.pool_mut()
    }

    /// Recorded type of an already visited node.
    fn type_of(&self, id: NodeId) -> TypeId {
        self.types.get_type(id).unwrap_or(TypeId::ERROR)
    }

    fn set_type(&mut self, id: NodeId, ty: TypeId) {
        self.types.set_type(id, ty);
    }

    fn is_constant(&self, id: NodeId) -> bool {
        self.types.is_compile_time_constant(id)
    }

    fn display(&self, ir: &Ir, ty: TypeId) -> String {
        self.types.pool().display(ty, ir.interner())
    }

    fn report(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }

    fn mismatch(&mut self, ir: &Ir, at: NodeId, expected: TypeId, found: TypeId) {
        let (expected, found) = (self.display(ir, expected), self.display(ir, found));
        self.report(type_mismatch(ir.span(at), &expected, &found));
    }

    fn error(&mut self, ir: &Ir, code: ErrorCode, at: NodeId, message: String) {
        self.report(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(ir.span(at), "here"),
        );
    }

    /// Innermost enclosing function, action, control or parser.
    fn enclosing_callable<'i>(&self, ir: &'i Ir) -> Option<&'i NodeKind> {
        self.callables.last().map(|&c| ir.kind(c))
    }
}

fn is_callable(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Function { .. }
            | NodeKind::Action { .. }
            | NodeKind::Control { .. }
            | NodeKind::Parser { .. }
    )
}

/// Type syntax and type declarations; their types are computed on demand.
fn is_type_level(kind: &NodeKind) -> bool {
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
            | NodeKind::TypeVar { .. }
            | NodeKind::StructField { .. }
            | NodeKind::TypeStruct { .. }
            | NodeKind::TypeHeader { .. }
            | NodeKind::TypeHeaderUnion { .. }
            | NodeKind::TypeEnum { .. }
            | NodeKind::TypeTypedef { .. }
            | NodeKind::TypeExtern { .. }
            | NodeKind::Method { .. }
            | NodeKind::TypePackage { .. }
            | NodeKind::TypeControl { .. }
            | NodeKind::TypeParser { .. }
            | NodeKind::DeclMatchKind { .. }
    )
}

impl Transform for Checker<'_> {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let kind = ir.kind(id);
        if is_type_level(kind) {
            return Rewrite::Prune;
        }
        if is_callable(kind) {
            self.callables.push(id);
        }
        if matches!(kind, NodeKind::ActionList { .. }) {
            self.action_lists += 1;
        }
        Rewrite::Continue
    }

    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let kind = ir.kind(id).clone();
        let out = match kind {
            // Expressions
            NodeKind::Constant { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::StringLiteral { .. } => {
                self.literal(ir, id);
                id
            }
            NodeKind::PathExpression { .. } => {
                self.path(ir, id);
                id
            }
            NodeKind::Member { expr, member } => self.member(ir, original, id, (expr, member)),
            NodeKind::Slice { expr, high, low } => self.slice(ir, id, (expr, high, low)),
            NodeKind::Unary { op, operand } => self.unary(ir, id, op, operand),
            NodeKind::Binary { op, left, right } => self.binary(ir, id, (op, left, right)),
            NodeKind::Mux {
                cond,
                if_true,
                if_false,
            } => self.mux(ir, id, (cond, if_true, if_false)),
            NodeKind::Cast { ty, expr } => self.cast(ir, id, ty, expr),
            NodeKind::MethodCall {
                method,
                type_args,
                args,
            } => self.call(ir, id, method, &type_args, args),
            NodeKind::ListExpression { components } => self.list(id, &components),
            NodeKind::SelectExpression { select, cases } => self.select(ir, id, select, cases),
            NodeKind::DefaultExpression => {
                self.set_type(id, TypeId::DONT_CARE);
                id
            }

            // Statements
            NodeKind::Assignment { left, right } => self.assignment(ir, id, left, right),
            NodeKind::IfStatement { cond, .. } => {
                self.expect_bool(ir, cond);
                id
            }
            NodeKind::ReturnStatement { expr } => self.return_statement(ir, id, expr),
            NodeKind::ExitStatement => {
                self.exit_statement(ir, id);
                id
            }
            NodeKind::SwitchStatement { expr, .. } => {
                self.switch_statement(ir, expr);
                id
            }

            // Declarations
            NodeKind::Parameter { default_value, .. } => {
                self.parameter(ir, original, id, default_value)
            }
            NodeKind::DeclVariable { ty, init, .. } => self.variable(ir, id, ty, init),
            NodeKind::DeclConstant { ty, init, .. } => self.constant(ir, id, ty, init),
            NodeKind::DeclInstance { ty, args, .. } => self.instance(ir, id, ty, args),
            NodeKind::KeyElement { match_kind, .. } => {
                self.key_element(ir, match_kind);
                id
            }
            NodeKind::ParserState { transition, .. } => {
                if let Some(transition) = transition {
                    self.transition(ir, transition);
                }
                id
            }
            NodeKind::Function { .. }
            | NodeKind::Action { .. }
            | NodeKind::Control { .. }
            | NodeKind::Parser { .. }
            | NodeKind::Table { .. } => {
                let ty = self.declared_type(ir, original);
                self.set_type(id, ty);
                id
            }
            _ => id,
        };

        let kind = ir.kind(original);
        if is_callable(kind) {
            self.callables.pop();
        }
        if matches!(kind, NodeKind::ActionList { .. }) {
            self.action_lists = self.action_lists.saturating_sub(1);
        }
        out
    }
}
