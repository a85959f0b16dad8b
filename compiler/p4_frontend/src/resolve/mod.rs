//! Reference resolution.
//!
//! Two phases over the same tree:
//!
//! 1. **Gather** opens a scope for every scope-forming node and enters each
//!    declaration with its traversal position.
//! 2. **Bind** resolves every path, type name and qualified enum member to
//!    its declaration by walking scopes outward.
//!
//! Both phases visit exactly the same nodes in the same order, so the
//! traversal position doubles as "textual position" for the
//! use-before-declaration rule. Parser states are exempt from that rule, and
//! `forward_refs` lifts it entirely.

use p4_diagnostic::{undeclared_name, Diagnostic, DiagnosticQueue, ErrorCode};
use p4_ir::{inspect, Inspector, Ir, Name, NodeId, NodeKind, Path, Visit};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::{ReferenceMap, ScopeId};

/// Resolver configuration.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ResolveOptions {
    /// Allow uses before declarations in any scope.
    pub forward_refs: bool,
    /// Warn when a declaration shadows one of a different kind.
    pub check_shadowing: bool,
}

/// Populates the reference map.
pub struct ResolveReferences {
    options: ResolveOptions,
}

impl ResolveReferences {
    pub fn new(forward_refs: bool) -> Self {
        ResolveReferences {
            options: ResolveOptions {
                forward_refs,
                check_shadowing: false,
            },
        }
    }

    /// Resolution that also reports shadowing.
    pub fn with_shadow_check(forward_refs: bool) -> Self {
        ResolveReferences {
            options: ResolveOptions {
                forward_refs,
                check_shadowing: true,
            },
        }
    }
}

impl Pass for ResolveReferences {
    fn name(&self) -> &str {
        "ResolveReferences"
    }

    fn populates(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        resolve(
            &ctx.ir,
            root,
            &mut ctx.ref_map,
            &mut ctx.diagnostics,
            self.options,
        );
        Ok(root)
    }
}

/// Clear `refs` and resolve every use in the tree rooted at `root`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve(
    ir: &Ir,
    root: NodeId,
    refs: &mut ReferenceMap,
    diags: &mut DiagnosticQueue,
    options: ResolveOptions,
) {
    refs.clear();
    let mut gather = Gather {
        refs,
        diags,
        check_shadowing: options.check_shadowing,
        stack: Vec::new(),
        position: 0,
        type_decls: Vec::new(),
    };
    inspect(&mut gather, ir, root);
    let type_decls = std::mem::take(&mut gather.type_decls);

    let mut bind = Bind {
        refs,
        diags,
        forward_refs: options.forward_refs,
        stack: Vec::new(),
        position: 0,
    };
    inspect(&mut bind, ir, root);

    check_type_cycles(ir, refs, diags, &type_decls);
    debug!(
        scopes = refs.scope_count(),
        references = refs.reference_count(),
        "resolved"
    );
}

/// Kinds that open a scope.
pub(crate) fn forms_scope(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Program { .. }
            | NodeKind::Control { .. }
            | NodeKind::Parser { .. }
            | NodeKind::ParserState { .. }
            | NodeKind::TypePackage { .. }
            | NodeKind::TypeControl { .. }
            | NodeKind::TypeParser { .. }
            | NodeKind::TypeExtern { .. }
            | NodeKind::Method { .. }
            | NodeKind::BlockStatement { .. }
            | NodeKind::Function { .. }
            | NodeKind::Action { .. }
            | NodeKind::Table { .. }
            | NodeKind::TypeEnum { .. }
    )
}

/// The name a node enters into its enclosing scope.
///
/// Struct fields are reached through types, not scopes.
fn scoped_name(kind: &NodeKind) -> Option<Name> {
    match kind {
        NodeKind::StructField { .. } => None,
        other => other.declared_name(),
    }
}

// === Gather ===

struct Gather<'a> {
    refs: &'a mut ReferenceMap,
    diags: &'a mut DiagnosticQueue,
    check_shadowing: bool,
    stack: Vec<ScopeId>,
    position: u32,
    type_decls: Vec<NodeId>,
}

impl Gather<'_> {
    fn declare(&mut self, ir: &Ir, id: NodeId, name: Name) {
        let Some(&scope) = self.stack.last() else {
            return;
        };
        let text = ir.name_str(name);
        self.refs.add_used_name(text);

        if self.check_shadowing {
            if let Some((_, outer)) = self
                .refs
                .parent(scope)
                .and_then(|parent| self.refs.lookup(parent, name))
            {
                let (inner_kind, outer_kind) = (ir.kind(id).tag(), ir.kind(outer).tag());
                if inner_kind != outer_kind {
                    self.diags.push(
                        Diagnostic::warning(ErrorCode::W1001)
                            .with_message(format!("`{text}` shadows an outer declaration"))
                            .with_label(ir.span(id), "declared here")
                            .with_secondary_label(ir.span(outer), "shadowed declaration"),
                    );
                }
            }
        }

        if let Err(previous) = self.refs.declare(scope, name, id, self.position) {
            // Extern methods overload by arity.
            let overload = matches!(ir.kind(id), NodeKind::Method { .. })
                && matches!(ir.kind(previous), NodeKind::Method { .. });
            if !overload {
                self.diags.push(
                    Diagnostic::error(ErrorCode::E1003)
                        .with_message(format!("`{text}` is declared more than once"))
                        .with_label(ir.span(id), "duplicate declaration")
                        .with_secondary_label(ir.span(previous), "first declared here"),
                );
            }
        }
    }
}

impl Inspector for Gather<'_> {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        self.position += 1;
        let kind = ir.kind(id);
        if let Some(name) = scoped_name(kind) {
            self.declare(ir, id, name);
        }
        if matches!(
            kind,
            NodeKind::TypeTypedef { .. }
                | NodeKind::TypeStruct { .. }
                | NodeKind::TypeHeader { .. }
                | NodeKind::TypeHeaderUnion { .. }
        ) {
            self.type_decls.push(id);
        }
        if forms_scope(kind) {
            let scope = self.refs.new_scope(id, self.stack.last().copied());
            self.stack.push(scope);
        }
        Visit::Continue
    }

    fn postorder(&mut self, ir: &Ir, id: NodeId) {
        if forms_scope(ir.kind(id)) {
            self.stack.pop();
        }
    }
}

// === Bind ===

enum Lookup {
    Found(NodeId),
    /// Only a declaration after the use exists.
    Later(NodeId),
    Missing,
}

struct Bind<'a> {
    refs: &'a mut ReferenceMap,
    diags: &'a mut DiagnosticQueue,
    forward_refs: bool,
    stack: Vec<ScopeId>,
    position: u32,
}

impl Bind<'_> {
    fn lookup(&self, ir: &Ir, path: Path) -> Lookup {
        let start = if path.absolute {
            self.stack.first()
        } else {
            self.stack.last()
        };
        let Some(&start) = start else {
            return Lookup::Missing;
        };
        let mut later = None;
        let mut current = Some(start);
        while let Some(scope) = current {
            if let Some(decl) = self.refs.lookup_local(scope, path.name) {
                let visible = self.forward_refs
                    || matches!(ir.kind(decl), NodeKind::ParserState { .. })
                    || self.refs.position(decl).is_some_and(|p| p <= self.position);
                if visible {
                    return Lookup::Found(decl);
                }
                later.get_or_insert(decl);
            }
            if path.absolute {
                break;
            }
            current = self.refs.parent(scope);
        }
        later.map_or(Lookup::Missing, Lookup::Later)
    }

    fn resolve_path(&mut self, ir: &Ir, id: NodeId, path: Path, want_type: bool) {
        let text = ir.name_str(path.name);
        match self.lookup(ir, path) {
            Lookup::Found(decl) => {
                if want_type && !ir.kind(decl).is_type_declaration() {
                    self.diags.push(
                        Diagnostic::error(ErrorCode::E1006)
                            .with_message(format!("`{text}` does not name a type"))
                            .with_label(ir.span(id), "expected a type")
                            .with_secondary_label(ir.span(decl), "declared here"),
                    );
                }
                if let Some(&scope) = self.stack.last() {
                    self.refs.set_declaration(id, decl, scope);
                }
            }
            Lookup::Later(decl) => {
                self.diags.push(
                    Diagnostic::error(ErrorCode::E1002)
                        .with_message(format!("`{text}` is used before its declaration"))
                        .with_label(ir.span(id), "used here")
                        .with_secondary_label(ir.span(decl), "declared here"),
                );
            }
            Lookup::Missing => {
                self.diags.push(undeclared_name(ir.span(id), text));
            }
        }
    }

    /// `E.member` where `E` names an enum.
    fn resolve_member(&mut self, ir: &Ir, id: NodeId, expr: NodeId, member: Name) {
        let Some(prefix) = self.refs.get_declaration(expr) else {
            return;
        };
        if !matches!(ir.kind(prefix), NodeKind::TypeEnum { .. }) {
            return;
        }
        let Some(member_scope) = self.refs.scope_of(prefix) else {
            return;
        };
        match self.refs.lookup_local(member_scope, member) {
            Some(decl) => {
                if let Some(&scope) = self.stack.last() {
                    self.refs.set_declaration(id, decl, scope);
                }
            }
            None => {
                self.diags.push(
                    Diagnostic::error(ErrorCode::E1004)
                        .with_message(format!(
                            "`{}` is not a member of `{}`",
                            ir.name_str(member),
                            ir.decl_name_str(prefix)
                        ))
                        .with_label(ir.span(id), "unknown member"),
                );
            }
        }
    }
}

impl Inspector for Bind<'_> {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        self.position += 1;
        let kind = ir.kind(id);
        if forms_scope(kind) {
            if let Some(scope) = self.refs.scope_of(id) {
                self.stack.push(scope);
            }
        }
        match kind {
            NodeKind::PathExpression { path } => self.resolve_path(ir, id, *path, false),
            NodeKind::TypeName { path } => self.resolve_path(ir, id, *path, true),
            _ => {}
        }
        Visit::Continue
    }

    fn postorder(&mut self, ir: &Ir, id: NodeId) {
        let kind = ir.kind(id);
        if let NodeKind::Member { expr, member } = kind {
            self.resolve_member(ir, id, *expr, *member);
        }
        if forms_scope(kind) && self.refs.scope_of(id).is_some() {
            self.stack.pop();
        }
    }
}

// === Cycles ===

/// Type declarations named (directly or through specializations) by the
/// type syntax under `id`.
fn type_dependencies(ir: &Ir, refs: &ReferenceMap, id: NodeId, out: &mut Vec<NodeId>) {
    if let NodeKind::TypeName { .. } = ir.kind(id) {
        if let Some(decl) = refs.get_declaration(id) {
            out.push(decl);
        }
    }
    ir.kind(id)
        .for_each_child(|child| type_dependencies(ir, refs, child, out));
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Mark {
    Active,
    Done,
}

fn check_type_cycles(
    ir: &Ir,
    refs: &ReferenceMap,
    diags: &mut DiagnosticQueue,
    type_decls: &[NodeId],
) {
    let mut marks: FxHashMap<NodeId, Mark> = FxHashMap::default();
    for &decl in type_decls {
        visit_type_decl(ir, refs, diags, decl, &mut marks);
    }
}

fn visit_type_decl(
    ir: &Ir,
    refs: &ReferenceMap,
    diags: &mut DiagnosticQueue,
    decl: NodeId,
    marks: &mut FxHashMap<NodeId, Mark>,
) {
    if marks.contains_key(&decl) {
        return;
    }
    marks.insert(decl, Mark::Active);
    let mut deps = Vec::new();
    type_dependencies(ir, refs, decl, &mut deps);
    for dep in deps {
        if !matches!(
            ir.kind(dep),
            NodeKind::TypeTypedef { .. }
                | NodeKind::TypeStruct { .. }
                | NodeKind::TypeHeader { .. }
                | NodeKind::TypeHeaderUnion { .. }
        ) {
            continue;
        }
        match marks.get(&dep) {
            Some(Mark::Active) => {
                diags.push(
                    Diagnostic::error(ErrorCode::E1005)
                        .with_message(format!(
                            "type `{}` refers to itself",
                            ir.decl_name_str(dep)
                        ))
                        .with_label(ir.span(decl), "part of a type cycle"),
                );
            }
            Some(Mark::Done) => {}
            None => visit_type_decl(ir, refs, diags, dep, marks),
        }
    }
    marks.insert(decl, Mark::Done);
}

#[cfg(test)]
mod tests;
