//! Constant folding.
//!
//! A bottom-up rewrite: after the children of an expression are folded, an
//! operator applied to literals is replaced by its literal result. Uses of
//! constants whose initializer folds to a literal are replaced by that
//! literal, and an `if` with a literal condition is replaced by the branch
//! taken.
//!
//! In typed mode the result type of each fold comes from a type map, and
//! every new node is recorded in that map.

mod eval;

use num_traits::ToPrimitive;
use p4_diagnostic::{internal_error, Diagnostic, DiagnosticQueue};
use p4_ir::{transform, BinaryOp, IntType, Ir, NodeId, NodeKind, Rewrite, Transform};
use p4_types::{TypeId, TypeMap, TypePool};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use self::eval::{fold_binary, fold_cast, fold_slice, fold_unary, CastTarget, FoldError, Value};
use crate::context::{FrontendContext, TypeMapSlot};
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::ReferenceMap;

/// Whether folding consults a type map.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FoldMode {
    /// Before type checking: result types follow the literal operands.
    Typeless,
    /// Result types are read from (and new nodes recorded in) a type map.
    Typed(TypeMapSlot),
}

pub struct ConstantFolding {
    mode: FoldMode,
}

impl ConstantFolding {
    pub fn new(mode: FoldMode) -> Self {
        ConstantFolding { mode }
    }

    pub fn typeless() -> Self {
        Self::new(FoldMode::Typeless)
    }

    pub fn typed(slot: TypeMapSlot) -> Self {
        Self::new(FoldMode::Typed(slot))
    }
}

impl Pass for ConstantFolding {
    fn name(&self) -> &str {
        match self.mode {
            FoldMode::Typeless => "ConstantFolding",
            FoldMode::Typed(_) => "ConstantFolding(typed)",
        }
    }

    fn reads(&self) -> Analyses {
        match self.mode {
            FoldMode::Typeless => Analyses::REFERENCES,
            FoldMode::Typed(slot) => Analyses::REFERENCES | slot.analysis(),
        }
    }

    fn invalidates(&self) -> Analyses {
        match self.mode {
            FoldMode::Typeless => Analyses::all(),
            FoldMode::Typed(slot) => Analyses::all() - slot.analysis(),
        }
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let types = match self.mode {
            FoldMode::Typeless => None,
            FoldMode::Typed(slot) => Some(ctx.type_maps.get_mut(slot)),
        };
        Ok(fold(
            &mut ctx.ir,
            root,
            &ctx.ref_map,
            types,
            &mut ctx.diagnostics,
        ))
    }
}

/// Fold the tree rooted at `root`; with `types`, fold in typed mode.
#[tracing::instrument(level = "debug", skip_all)]
pub fn fold(
    ir: &mut Ir,
    root: NodeId,
    refs: &ReferenceMap,
    types: Option<&mut TypeMap>,
    diags: &mut DiagnosticQueue,
) -> NodeId {
    let mut folder = Folder {
        refs,
        types,
        diags,
        constants: FxHashMap::default(),
        folded: 0,
    };
    let new_root = transform(&mut folder, ir, root);
    debug!(folded = folder.folded, changed = new_root != root, "constant folding done");
    new_root
}

struct Folder<'a> {
    refs: &'a ReferenceMap,
    types: Option<&'a mut TypeMap>,
    diags: &'a mut DiagnosticQueue,
    /// Constant declarations (original ids) whose value is a literal.
    constants: FxHashMap<NodeId, NodeId>,
    folded: usize,
}

/// Type a folded node must have.
enum Expected {
    Untyped,
    Typed(TypeId),
}

fn literal(ir: &Ir, id: NodeId) -> Option<Value> {
    match ir.kind(id) {
        NodeKind::Constant { value, ty, .. } => Some(Value::Int {
            value: value.clone(),
            ty: *ty,
        }),
        NodeKind::BoolLiteral { value } => Some(Value::Bool(*value)),
        _ => None,
    }
}

fn int_type_of(pool: &TypePool, ty: TypeId) -> Option<IntType> {
    if ty == TypeId::INF_INT {
        return Some(IntType::Infinite);
    }
    pool.bits_of(ty)
        .map(|(width, signed)| IntType::Bits { width, signed })
}

/// Literal type named by cast or declaration type syntax.
fn syntax_int_type(ir: &Ir, ty: NodeId) -> Option<CastTarget> {
    match ir.kind(ty) {
        NodeKind::TypeBits { width, signed } => Some(CastTarget::Int(IntType::Bits {
            width: *width,
            signed: *signed,
        })),
        NodeKind::TypeInfInt => Some(CastTarget::Int(IntType::Infinite)),
        NodeKind::TypeBool => Some(CastTarget::Bool),
        _ => None,
    }
}

fn small_constant(ir: &Ir, id: NodeId) -> Option<u32> {
    match ir.kind(id) {
        NodeKind::Constant { value, .. } => value.to_u32(),
        _ => None,
    }
}

impl Folder<'_> {
    fn report(&mut self, ir: &Ir, id: NodeId, error: FoldError) {
        self.diags.push(
            Diagnostic::error(error.code())
                .with_message(error.message())
                .with_label(ir.span(id), "in this expression"),
        );
    }

    /// The type the result of folding `original` must have. In typed mode a
    /// missing entry is reported and folding is skipped.
    fn expected(&mut self, ir: &Ir, original: NodeId) -> Option<Expected> {
        let Some(types) = self.types.as_deref() else {
            return Some(Expected::Untyped);
        };
        match types.get_type(original) {
            Some(ty) => Some(Expected::Typed(ty)),
            None => {
                self.diags.push(internal_error(
                    ir.span(original),
                    format!("no type recorded for `{}` while folding", ir.kind(original).tag()),
                ));
                None
            }
        }
    }

    /// Allocate the literal for `value`, typed as `expected` when known.
    fn materialize(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        value: Value,
        expected: &Expected,
    ) -> NodeId {
        let span = ir.span(original);
        let kind = match value {
            Value::Bool(value) => NodeKind::BoolLiteral { value },
            Value::Int { value, ty } => {
                let ty = match (expected, self.types.as_deref()) {
                    (Expected::Typed(t), Some(types)) => {
                        int_type_of(types.pool(), *t).unwrap_or(ty)
                    }
                    _ => ty,
                };
                let base = match ir.kind(original) {
                    NodeKind::Constant { base, .. } => *base,
                    _ => 10,
                };
                NodeKind::Constant {
                    value: eval::wrap(value, ty),
                    ty,
                    base,
                }
            }
        };
        let new = ir.alloc(kind, span);
        if let Some(types) = self.types.as_deref_mut() {
            if let Expected::Typed(ty) = expected {
                types.set_type(new, *ty);
            }
            types.set_compile_time_constant(new);
        }
        self.folded += 1;
        trace!(node = ?original, "folded to {:?}", ir.kind(new).tag());
        new
    }

    fn finish(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        result: Result<Option<Value>, FoldError>,
        id: NodeId,
    ) -> NodeId {
        match result {
            Ok(Some(value)) => match self.expected(ir, original) {
                Some(expected) => self.materialize(ir, original, value, &expected),
                None => id,
            },
            Ok(None) => id,
            Err(error) => {
                self.report(ir, original, error);
                id
            }
        }
    }

    fn binary(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        id: NodeId,
        (op, left, right): (BinaryOp, NodeId, NodeId),
    ) -> NodeId {
        // Short-circuit on a literal left operand.
        if let (BinaryOp::LAnd | BinaryOp::LOr, Some(Value::Bool(l))) = (op, literal(ir, left)) {
            let decides = (op == BinaryOp::LAnd) != l;
            return if decides { left } else { right };
        }
        let (Some(l), Some(r)) = (literal(ir, left), literal(ir, right)) else {
            return id;
        };
        let result = fold_binary(op, &l, &r);
        self.finish(ir, original, result, id)
    }

    fn cast(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        id: NodeId,
        (ty, expr): (NodeId, NodeId),
    ) -> NodeId {
        let Some(value) = literal(ir, expr) else {
            return id;
        };
        let target = match syntax_int_type(ir, ty) {
            Some(target) => target,
            None => {
                // Typedef or other named type: use the recorded type.
                let recorded = self.types.as_deref().and_then(|types| {
                    let ty = types.get_type(original)?;
                    if ty == TypeId::BOOL {
                        Some(CastTarget::Bool)
                    } else {
                        int_type_of(types.pool(), ty).map(CastTarget::Int)
                    }
                });
                let Some(target) = recorded else {
                    return id;
                };
                target
            }
        };
        let result = fold_cast(&value, target);
        self.finish(ir, original, result, id)
    }

    fn slice(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        id: NodeId,
        (expr, high, low): (NodeId, NodeId, NodeId),
    ) -> NodeId {
        let Some(value) = literal(ir, expr) else {
            return id;
        };
        let (Some(h), Some(l)) = (small_constant(ir, high), small_constant(ir, low)) else {
            return id;
        };
        let result = fold_slice(&value, h, l);
        self.finish(ir, original, result, id)
    }

    /// A use of a constant declaration with a literal value.
    fn path(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let Some(decl) = self.refs.get_declaration(original) else {
            return id;
        };
        let Some(&init) = self.constants.get(&decl) else {
            return id;
        };
        let Some(value) = literal(ir, init) else {
            return id;
        };
        match self.expected(ir, original) {
            Some(expected) => self.materialize(ir, original, value, &expected),
            None => id,
        }
    }

    /// Remember a constant whose initializer is (now) a literal, converted
    /// to the declared type.
    fn constant_decl(&mut self, ir: &mut Ir, original: NodeId, ty: NodeId, init: NodeId) {
        let Some(value) = literal(ir, init) else {
            return;
        };
        let converted = match (syntax_int_type(ir, ty), &value) {
            (Some(CastTarget::Int(target)), Value::Int { ty: IntType::Infinite, value }) => {
                let span = ir.span(init);
                ir.alloc(
                    NodeKind::Constant {
                        value: eval::wrap(value.clone(), target),
                        ty: target,
                        base: 10,
                    },
                    span,
                )
            }
            _ => init,
        };
        self.constants.insert(original, converted);
    }
}

impl Transform for Folder<'_> {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let kind = ir.kind(id);
        if kind.is_type_declaration()
            && !matches!(kind, NodeKind::Control { .. } | NodeKind::Parser { .. })
        {
            return Rewrite::Prune;
        }
        Rewrite::Continue
    }

    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let result = match ir.kind(id).clone() {
            NodeKind::Binary { op, left, right } => self.binary(ir, original, id, (op, left, right)),
            NodeKind::Unary { op, operand } => match literal(ir, operand) {
                Some(value) => {
                    let folded = fold_unary(op, &value);
                    self.finish(ir, original, Ok(folded), id)
                }
                None => id,
            },
            NodeKind::Mux {
                cond,
                if_true,
                if_false,
            } => match literal(ir, cond) {
                Some(Value::Bool(true)) => if_true,
                Some(Value::Bool(false)) => if_false,
                _ => id,
            },
            NodeKind::Cast { ty, expr } => self.cast(ir, original, id, (ty, expr)),
            NodeKind::Slice { expr, high, low } => self.slice(ir, original, id, (expr, high, low)),
            NodeKind::PathExpression { .. } => self.path(ir, original, id),
            NodeKind::DeclConstant { ty, init, .. } => {
                self.constant_decl(ir, original, ty, init);
                id
            }
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            } => match literal(ir, cond) {
                Some(Value::Bool(true)) => if_true,
                Some(Value::Bool(false)) => match if_false {
                    Some(otherwise) => otherwise,
                    None => ir.replace_kind(id, NodeKind::EmptyStatement),
                },
                _ => id,
            },
            _ => id,
        };
        // Rebuilt parents keep the facts of the node they replace.
        if id != original && result == id {
            if let Some(types) = self.types.as_deref_mut() {
                types.copy_entry(original, id);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests;
