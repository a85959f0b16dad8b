//! Specialization of generic controls, parsers and functions.
//!
//! Two passes share a [`SpecializationList`] kept in the context:
//!
//! - [`FindBlocksToSpecialize`] reads the reference map and the primary
//!   type map and enqueues one entry per distinct (generic, type arguments)
//!   pair, remembering every site that uses it.
//! - [`SpecializeBlocks`] inserts a renamed, non-generic copy per entry
//!   before the top-level declaration holding its first site, points the
//!   sites at the copy and drains the list.
//!
//! Sites inside generic declarations are skipped; they are reached once the
//! enclosing declaration itself has been specialized.

use p4_ir::{inspect, transform, Inspector, Ir, Name, NodeId, NodeKind, Path, Transform, Visit};
use p4_types::{Type, TypeId, TypeMap, TypePool};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::ReferenceMap;

/// One pending copy of a generic declaration.
#[derive(Clone, Debug)]
pub struct Specialization {
    /// The generic `Control`, `Parser` or `Function`.
    pub generic: NodeId,
    /// Canonical type arguments, in the type pool of the primary map.
    pub type_args: Vec<TypeId>,
    /// Type syntax substituted for each type parameter.
    pub arg_syntax: Vec<NodeId>,
    /// Fresh name of the copy.
    pub name: String,
    /// Top-level declaration the copy is inserted before.
    pub insert_before: NodeId,
    /// Instantiations and calls to rewrite.
    pub sites: Vec<NodeId>,
}

/// Pending specializations, in discovery order.
#[derive(Debug, Default)]
pub struct SpecializationList {
    entries: Vec<Specialization>,
}

impl SpecializationList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specialization> {
        self.entries.iter()
    }

    fn find_mut(&mut self, generic: NodeId, type_args: &[TypeId]) -> Option<&mut Specialization> {
        self.entries
            .iter_mut()
            .find(|e| e.generic == generic && e.type_args == type_args)
    }

    /// Remove and return every pending entry.
    pub fn take(&mut self) -> Vec<Specialization> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub struct FindBlocksToSpecialize;

impl Pass for FindBlocksToSpecialize {
    fn name(&self) -> &str {
        "FindBlocksToSpecialize"
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES | Analyses::PRIMARY_TYPES
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        find_specializations(
            &mut ctx.ir,
            root,
            &mut ctx.ref_map,
            &ctx.type_maps.primary,
            &mut ctx.specializations,
        );
        Ok(root)
    }
}

pub struct SpecializeBlocks;

impl Pass for SpecializeBlocks {
    fn name(&self) -> &str {
        "SpecializeBlocks"
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(specialize(
            &mut ctx.ir,
            root,
            &ctx.ref_map,
            &mut ctx.specializations,
        ))
    }
}

/// A use of a generic declaration with concrete type arguments.
struct Site {
    node: NodeId,
    generic: NodeId,
    type_args: Vec<TypeId>,
    holder: NodeId,
}

/// Enqueue every specializable site in the program rooted at `root`.
///
/// Only allocates detached type syntax; the tree itself is unchanged.
#[tracing::instrument(level = "debug", skip_all)]
pub fn find_specializations(
    ir: &mut Ir,
    root: NodeId,
    refs: &mut ReferenceMap,
    types: &TypeMap,
    list: &mut SpecializationList,
) {
    let NodeKind::Program { decls } = ir.kind(root) else {
        return;
    };
    let mut collector = Collector {
        refs: &*refs,
        types,
        generic_depth: 0,
        holder: root,
        sites: Vec::new(),
    };
    for &decl in decls {
        collector.holder = decl;
        inspect(&mut collector, ir, decl);
    }
    let sites = collector.sites;

    let before = list.len();
    for site in sites {
        if let Some(entry) = list.find_mut(site.generic, &site.type_args) {
            entry.sites.push(site.node);
            continue;
        }
        let syntax: Option<Vec<NodeId>> = site
            .type_args
            .iter()
            .map(|&ty| type_syntax(ir, types.pool(), ty))
            .collect();
        let Some(arg_syntax) = syntax else {
            trace!(site = site.node.raw(), "type arguments have no syntax");
            continue;
        };
        let name = refs.new_name(ir.decl_name_str(site.generic));
        trace!(generic = ir.decl_name_str(site.generic), name = %name, "enqueued");
        list.entries.push(Specialization {
            generic: site.generic,
            type_args: site.type_args,
            arg_syntax,
            name,
            insert_before: site.holder,
            sites: vec![site.node],
        });
    }
    debug!(found = list.len() - before, "specializations found");
}

struct Collector<'a> {
    refs: &'a ReferenceMap,
    types: &'a TypeMap,
    /// Number of enclosing generic declarations.
    generic_depth: usize,
    /// Top-level declaration being scanned.
    holder: NodeId,
    sites: Vec<Site>,
}

impl Collector<'_> {
    fn site(&self, ir: &Ir, id: NodeId) -> Option<Site> {
        let generic = match ir.kind(id) {
            NodeKind::DeclInstance { ty, .. } => match ir.kind(*ty) {
                NodeKind::TypeSpecialized { base, .. } => self.refs.get_declaration(*base)?,
                _ => return None,
            },
            NodeKind::MethodCall {
                method, type_args, ..
            } => {
                let target = self.refs.get_declaration(*method)?;
                // Blocks are specialized only for explicit type arguments.
                let block = matches!(ir.kind(target), NodeKind::Control { .. } | NodeKind::Parser { .. });
                if block && type_args.is_empty() {
                    return None;
                }
                target
            }
            _ => return None,
        };
        if !is_generic(ir.kind(generic)) {
            return None;
        }
        let type_args = self.types.type_args(id)?;
        if type_args.is_empty()
            || type_args
                .iter()
                .any(|&t| self.types.pool().contains_type_vars(t))
        {
            return None;
        }
        Some(Site {
            node: id,
            generic,
            type_args: type_args.to_vec(),
            holder: self.holder,
        })
    }
}

impl Inspector for Collector<'_> {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        if is_generic(ir.kind(id)) {
            self.generic_depth += 1;
        } else if self.generic_depth == 0 {
            if let Some(site) = self.site(ir, id) {
                self.sites.push(site);
            }
        }
        Visit::Continue
    }

    fn postorder(&mut self, ir: &Ir, id: NodeId) {
        if is_generic(ir.kind(id)) {
            self.generic_depth = self.generic_depth.saturating_sub(1);
        }
    }
}

/// Declarations this module knows how to copy.
fn is_generic(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Control { .. } | NodeKind::Parser { .. } | NodeKind::Function { .. }
    ) && !kind.type_params().is_empty()
}

/// Type syntax denoting `ty`, if it can be written at the top level.
fn type_syntax(ir: &mut Ir, pool: &TypePool, ty: TypeId) -> Option<NodeId> {
    let syntax = match pool.get(ty) {
        Type::Bool => ir.bool_type(),
        Type::Void => ir.void_type(),
        Type::String => ir.string_type(),
        Type::Bits { width, signed } => {
            if *signed {
                ir.signed_bits(*width)
            } else {
                ir.bits(*width)
            }
        }
        Type::Tuple(components) => {
            let components = components
                .iter()
                .map(|&c| type_syntax(ir, pool, c))
                .collect::<Option<Vec<_>>>()?;
            ir.tuple_type(components)
        }
        Type::Specialized { base, args } => {
            let name = ir.name_str(pool.get(*base).nominal_name()?);
            let args = args
                .iter()
                .map(|&a| type_syntax(ir, pool, a))
                .collect::<Option<Vec<_>>>()?;
            ir.specialized(name, args)
        }
        Type::Var { .. } | Type::Table { .. } => return None,
        nominal => {
            let name = ir.name_str(nominal.nominal_name()?);
            ir.type_name(name)
        }
    };
    Some(syntax)
}

/// Insert the pending copies and rewrite their sites.
#[tracing::instrument(level = "debug", skip_all)]
pub fn specialize(
    ir: &mut Ir,
    root: NodeId,
    refs: &ReferenceMap,
    list: &mut SpecializationList,
) -> NodeId {
    let pending = list.take();
    let NodeKind::Program { decls } = ir.kind(root).clone() else {
        return root;
    };
    if pending.is_empty() {
        return root;
    }

    let mut copies = Vec::with_capacity(pending.len());
    let mut renames: FxHashMap<NodeId, Name> = FxHashMap::default();
    for entry in &pending {
        let copy = instantiate(ir, refs, entry);
        let name = ir.intern(&entry.name);
        for &site in &entry.sites {
            renames.insert(site, name);
        }
        debug!(
            generic = ir.decl_name_str(entry.generic),
            name = %entry.name,
            sites = entry.sites.len(),
            "specialized"
        );
        copies.push((entry.insert_before, copy));
    }

    let mut rewriter = SiteRewriter { renames: &renames };
    let mut out = Vec::with_capacity(decls.len() + copies.len());
    for decl in decls {
        copies.retain(|&(before, copy)| {
            if before == decl {
                out.push(copy);
            }
            before != decl
        });
        out.push(transform(&mut rewriter, ir, decl));
    }
    out.extend(copies.into_iter().map(|(_, copy)| copy));
    ir.replace_kind(root, NodeKind::Program { decls: out })
}

/// A renamed copy of `entry.generic` with its type parameters substituted.
fn instantiate(ir: &mut Ir, refs: &ReferenceMap, entry: &Specialization) -> NodeId {
    let bindings: FxHashMap<NodeId, NodeId> = ir
        .kind(entry.generic)
        .type_params()
        .iter()
        .copied()
        .zip(entry.arg_syntax.iter().copied())
        .collect();
    let copy = ir.deep_clone_with(entry.generic, &mut |ir, node| {
        if !matches!(ir.kind(node), NodeKind::TypeName { .. }) {
            return None;
        }
        let arg = *bindings.get(&refs.get_declaration(node)?)?;
        Some(ir.deep_clone(arg))
    });

    let name = ir.intern(&entry.name);
    let kind = match ir.kind(copy).clone() {
        NodeKind::Control {
            params,
            ctor_params,
            locals,
            body,
            ..
        } => NodeKind::Control {
            name,
            type_params: Vec::new(),
            params,
            ctor_params,
            locals,
            body,
        },
        NodeKind::Parser {
            params,
            ctor_params,
            locals,
            states,
            ..
        } => NodeKind::Parser {
            name,
            type_params: Vec::new(),
            params,
            ctor_params,
            locals,
            states,
        },
        NodeKind::Function {
            params,
            return_type,
            body,
            ..
        } => NodeKind::Function {
            name,
            type_params: Vec::new(),
            params,
            return_type,
            body,
        },
        other => other,
    };
    ir.replace_kind(copy, kind)
}

/// Points each site at its specialized copy.
struct SiteRewriter<'a> {
    renames: &'a FxHashMap<NodeId, Name>,
}

impl Transform for SiteRewriter<'_> {
    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let Some(&name) = self.renames.get(&original) else {
            return id;
        };
        let path = Path::new(name);
        let kind = match ir.kind(id).clone() {
            NodeKind::DeclInstance {
                name: instance,
                ty,
                args,
            } => {
                let ty = ir.replace_kind(ty, NodeKind::TypeName { path });
                NodeKind::DeclInstance {
                    name: instance,
                    ty,
                    args,
                }
            }
            NodeKind::MethodCall { method, args, .. } => {
                let method = ir.replace_kind(method, NodeKind::PathExpression { path });
                NodeKind::MethodCall {
                    method,
                    type_args: Vec::new(),
                    args,
                }
            }
            _ => return id,
        };
        trace!(site = original.raw(), "site rewritten");
        ir.replace_kind(id, kind)
    }
}
