//! P4-16 frontend pass pipeline.
//!
//! Takes a parsed program (an [`Ir`](p4_ir::Ir) arena and its root) and runs
//! the frontend: validation, built-in synthesis, reference resolution, type
//! checking with implicit casts, constant folding, strength reduction,
//! control-flow simplification, generic specialization, table-parameter
//! lifting and dead-declaration removal.
//!
//! # Architecture
//!
//! - **Context** (`context.rs`): [`FrontendContext`] owns the IR, both
//!   analysis maps, the pending specializations and the diagnostics
//! - **Pass manager** (`pass_manager/`): sequences, fixpoint loops,
//!   stop-on-error and analysis freshness
//! - **Analyses** (`ref_map/`, `resolve/`, `typecheck/`): populate the
//!   reference map and type maps
//! - **Rewrites**: one module per pass
//! - **Driver** (`pipeline/`): [`run_frontend`]
//!
//! # Debugging
//!
//! - `RUST_LOG=p4_frontend=debug` - one line per pass with its outcome
//! - `RUST_LOG=p4_frontend=trace` - per-node decisions (very verbose)

pub mod builtins;
pub mod checkpoint;
pub mod const_fold;
pub mod context;
pub mod pass_manager;
pub mod pipeline;
pub mod ref_map;
pub mod resolve;
pub mod simplify;
pub mod specialize;
pub mod strength;
pub mod table_params;
pub mod typecheck;
pub mod unused;
pub mod validate;

pub use builtins::CreateBuiltins;
pub use checkpoint::{DumpStreamFactory, MemoryDumpStreams, SharedDumpStreams, ToP4};
pub use const_fold::{ConstantFolding, FoldMode};
pub use context::{FrontendContext, TypeMapSlot, TypeMaps};
pub use pass_manager::{apply_pass, Analyses, Pass, PassError, PassManager, PassRepeated};
pub use pipeline::{build_frontend, run_frontend, run_frontend_in, FrontendOptions, FrontendOutput};
pub use ref_map::{ReferenceMap, ScopeId};
pub use resolve::{ResolveOptions, ResolveReferences};
pub use simplify::SimplifyControlFlow;
pub use specialize::{FindBlocksToSpecialize, SpecializationList, SpecializeBlocks};
pub use strength::StrengthReduction;
pub use table_params::RemoveTableParameters;
pub use typecheck::{CheckMode, TypeChecker};
pub use unused::RemoveUnusedDeclarations;
pub use validate::ValidateParsedProgram;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
