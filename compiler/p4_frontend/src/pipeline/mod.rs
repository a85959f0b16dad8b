//! The frontend driver.
//!
//! [`build_frontend`] assembles the fixed pass sequence; [`run_frontend`]
//! runs it over a parsed program and hands back the final tree and the
//! diagnostics.
//!
//! ```text
//! post-parse dump
//! validate → builtins → resolve → fold
//! resolve → type check (learn) → simplify → resolve → fold (typed) → strength
//! repeat { resolve → check → find/specialize → resolve → check → fold }
//! mid dump (-fe)
//! repeat { resolve → remove unused }
//! last dump (-last)
//! ```

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use p4_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use p4_ir::{Ir, NodeId};
use tracing::debug;

use crate::builtins::CreateBuiltins;
use crate::checkpoint::{DumpStreamFactory, SharedDumpStreams, ToP4};
use crate::const_fold::ConstantFolding;
use crate::context::{FrontendContext, TypeMapSlot};
use crate::pass_manager::{apply_pass, PassError, PassManager, PassRepeated, DEFAULT_MAX_ITERATIONS};
use crate::resolve::ResolveReferences;
use crate::simplify::SimplifyControlFlow;
use crate::specialize::{FindBlocksToSpecialize, SpecializeBlocks};
use crate::strength::StrengthReduction;
use crate::typecheck::TypeChecker;
use crate::unused::RemoveUnusedDeclarations;
use crate::validate::ValidateParsedProgram;

/// Tag of the dump taken after the specialization loop.
pub const MID_DUMP_TAG: &str = "-fe";
/// Tag of the final dump.
pub const LAST_DUMP_TAG: &str = "-last";

/// Frontend configuration.
pub struct FrontendOptions {
    /// Print the program as parsed to this path.
    pub pretty_print_path: Option<PathBuf>,
    /// Allow uses before declarations everywhere.
    pub forward_refs: bool,
    /// Where the checkpoints write; `None` disables the mid and last dumps.
    pub dump_streams: Option<Box<dyn DumpStreamFactory>>,
    /// Cap on the iterations of each fixpoint loop.
    pub max_fixpoint_iterations: usize,
    /// Queue configuration used by [`run_frontend`].
    pub diagnostics: DiagnosticConfig,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        FrontendOptions {
            pretty_print_path: None,
            forward_refs: false,
            dump_streams: None,
            max_fixpoint_iterations: DEFAULT_MAX_ITERATIONS,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl fmt::Debug for FrontendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontendOptions")
            .field("pretty_print_path", &self.pretty_print_path)
            .field("forward_refs", &self.forward_refs)
            .field("dump_streams", &self.dump_streams.is_some())
            .field("max_fixpoint_iterations", &self.max_fixpoint_iterations)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Result of a frontend run. The root is returned even when errors were
/// reported; it is the tree as it stood when the run stopped.
#[derive(Debug)]
pub struct FrontendOutput {
    pub root: NodeId,
    /// Every diagnostic, sorted by position.
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
}

impl FrontendOutput {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// The full frontend sequence for `options`. Stops after the first pass that
/// reports an error.
pub fn build_frontend(options: FrontendOptions) -> PassManager {
    let FrontendOptions {
        pretty_print_path,
        forward_refs,
        dump_streams,
        max_fixpoint_iterations,
        ..
    } = options;
    let streams: Option<SharedDumpStreams> = dump_streams.map(|s| Rc::new(RefCell::new(s)));

    let mut frontend = PassManager::new("FrontEnd");
    frontend.set_stop_on_error(true);

    if let Some(path) = pretty_print_path {
        match &streams {
            Some(streams) => frontend.add(ToP4::new(
                "ToP4(post-parse)",
                path.display().to_string(),
                Rc::clone(streams),
            )),
            None => frontend.add(ToP4::to_file("ToP4(post-parse)", path)),
        }
    }

    frontend.add(ValidateParsedProgram);
    frontend.add(CreateBuiltins);
    frontend.add(ResolveReferences::with_shadow_check(forward_refs));
    frontend.add(ConstantFolding::typeless());
    frontend.add(ResolveReferences::new(forward_refs));
    frontend.add(TypeChecker::learn(TypeMapSlot::Primary, forward_refs));
    frontend.add(SimplifyControlFlow);
    frontend.add(ResolveReferences::new(forward_refs));
    frontend.add(ConstantFolding::typed(TypeMapSlot::Primary));
    frontend.add(StrengthReduction);

    let mut specialization = PassRepeated::new("Specialization")
        .with(ResolveReferences::new(forward_refs))
        .with(TypeChecker::update(TypeMapSlot::Primary))
        .with(FindBlocksToSpecialize)
        .with(SpecializeBlocks)
        .with(ResolveReferences::new(forward_refs))
        .with(TypeChecker::update(TypeMapSlot::Secondary))
        .with(ConstantFolding::typed(TypeMapSlot::Secondary))
        .with_max_iterations(max_fixpoint_iterations);
    specialization.set_stop_on_error(true);
    frontend.add(specialization);

    if let Some(streams) = &streams {
        frontend.add(ToP4::new("ToP4(mid)", MID_DUMP_TAG, Rc::clone(streams)));
    }

    let mut cleanup = PassRepeated::new("RemoveAllUnusedDeclarations")
        .with(ResolveReferences::new(forward_refs))
        .with(RemoveUnusedDeclarations)
        .with_max_iterations(max_fixpoint_iterations);
    cleanup.set_stop_on_error(true);
    frontend.add(cleanup);

    if let Some(streams) = &streams {
        frontend.add(ToP4::new("ToP4(last)", LAST_DUMP_TAG, Rc::clone(streams)));
    }
    frontend
}

/// Run the frontend over the program rooted at `root`.
///
/// The arena is moved into a fresh context for the run and moved back
/// afterwards, so `ir` holds every node of the result, error or not.
pub fn run_frontend(
    ir: &mut Ir,
    root: NodeId,
    mut options: FrontendOptions,
) -> Result<FrontendOutput, PassError> {
    let queue = DiagnosticQueue::with_config(std::mem::take(&mut options.diagnostics));
    let mut ctx = FrontendContext::with_diagnostics(std::mem::take(ir), queue);
    let result = run_frontend_in(&mut ctx, root, options);
    *ir = ctx.ir;
    result
}

/// Run the frontend inside an existing context, draining its diagnostics.
#[tracing::instrument(level = "debug", skip_all)]
pub fn run_frontend_in(
    ctx: &mut FrontendContext,
    root: NodeId,
    options: FrontendOptions,
) -> Result<FrontendOutput, PassError> {
    let mut frontend = build_frontend(options);
    let root = apply_pass(&mut frontend, ctx, root)?;
    let error_count = ctx.error_count();
    let diagnostics = ctx.diagnostics.flush();
    debug!(
        errors = error_count,
        diagnostics = diagnostics.len(),
        nodes = ctx.ir.len(),
        "frontend finished"
    );
    Ok(FrontendOutput {
        root,
        diagnostics,
        error_count,
    })
}
