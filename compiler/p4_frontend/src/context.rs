//! Pipeline-scoped state shared by all passes.
//!
//! The IR arena, both analysis maps, the pending specializations and the
//! diagnostic queue live here. Passes receive `&mut FrontendContext` and
//! borrow the fields they need separately.

use p4_diagnostic::{Diagnostic, DiagnosticQueue};
use p4_ir::Ir;
use p4_types::TypeMap;

use crate::pass_manager::Analyses;
use crate::ref_map::ReferenceMap;
use crate::specialize::SpecializationList;

/// Which of the two type maps a pass works on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeMapSlot {
    /// Filled by the first checker run and the specialization round.
    Primary,
    /// Filled by the checker run feeding typed constant folding.
    Secondary,
}

impl TypeMapSlot {
    /// The freshness flag of this slot.
    pub fn analysis(self) -> Analyses {
        match self {
            TypeMapSlot::Primary => Analyses::PRIMARY_TYPES,
            TypeMapSlot::Secondary => Analyses::SECONDARY_TYPES,
        }
    }
}

#[derive(Debug, Default)]
pub struct TypeMaps {
    pub primary: TypeMap,
    pub secondary: TypeMap,
}

impl TypeMaps {
    pub fn get(&self, slot: TypeMapSlot) -> &TypeMap {
        match slot {
            TypeMapSlot::Primary => &self.primary,
            TypeMapSlot::Secondary => &self.secondary,
        }
    }

    pub fn get_mut(&mut self, slot: TypeMapSlot) -> &mut TypeMap {
        match slot {
            TypeMapSlot::Primary => &mut self.primary,
            TypeMapSlot::Secondary => &mut self.secondary,
        }
    }
}

#[derive(Debug)]
pub struct FrontendContext {
    pub ir: Ir,
    pub ref_map: ReferenceMap,
    pub type_maps: TypeMaps,
    pub specializations: SpecializationList,
    pub diagnostics: DiagnosticQueue,
    /// Analyses invalidated by an IR change and not repopulated since.
    stale: Analyses,
}

impl FrontendContext {
    /// A context over `ir`; nothing has been computed yet, so every analysis
    /// starts stale.
    pub fn new(ir: Ir) -> Self {
        Self::with_diagnostics(ir, DiagnosticQueue::new())
    }

    pub fn with_diagnostics(ir: Ir, diagnostics: DiagnosticQueue) -> Self {
        FrontendContext {
            ir,
            ref_map: ReferenceMap::new(),
            type_maps: TypeMaps::default(),
            specializations: SpecializationList::default(),
            diagnostics,
            stale: Analyses::all(),
        }
    }

    pub fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    /// Errors reported so far, counting those the queue dropped. Compare it
    /// across a pass to learn whether the pass failed.
    pub fn reported_errors(&self) -> usize {
        self.diagnostics.reported_errors()
    }

    pub fn stale(&self) -> Analyses {
        self.stale
    }

    pub(crate) fn mark_fresh(&mut self, analyses: Analyses) {
        self.stale.remove(analyses);
    }

    pub(crate) fn mark_stale(&mut self, analyses: Analyses) {
        self.stale.insert(analyses);
    }
}
