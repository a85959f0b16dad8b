//! Pass sequencing: sequences, fixpoint loops, stop-on-error and analysis
//! freshness.
//!
//! Every pass declares which analyses it reads, which it populates, and
//! which it invalidates when it changes the IR. [`apply_pass`] enforces
//! these declarations: running a pass whose inputs are stale is a fatal
//! [`PassError::StaleAnalysis`].

use bitflags::bitflags;
use p4_ir::NodeId;
use tracing::debug;

use crate::context::FrontendContext;

bitflags! {
    /// Analyses a pass may read or populate.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Analyses: u8 {
        /// The reference map.
        const REFERENCES = 1 << 0;
        /// The primary type map.
        const PRIMARY_TYPES = 1 << 1;
        /// The secondary type map.
        const SECONDARY_TYPES = 1 << 2;
    }
}

/// Fatal pass failure. User errors are diagnostics, not `PassError`s.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("pass `{pass}` reads {analyses:?} after an IR change invalidated it")]
    StaleAnalysis { pass: String, analyses: Analyses },

    #[error(
        "`{pass}` did not reach a fixpoint after {limit} iterations (last change by `{last_changed}`)"
    )]
    IterationLimit {
        pass: String,
        limit: usize,
        last_changed: String,
    },

    #[error("internal error in `{pass}`: {message}")]
    Internal { pass: String, message: String },

    #[error("cannot write dump `{tag}`")]
    Dump {
        tag: String,
        #[source]
        source: std::io::Error,
    },
}

/// A frontend pass.
pub trait Pass {
    fn name(&self) -> &str;

    /// Analyses that must be fresh when the pass starts.
    fn reads(&self) -> Analyses {
        Analyses::empty()
    }

    /// Analyses the pass (re)computes for the tree it returns.
    fn populates(&self) -> Analyses {
        Analyses::empty()
    }

    /// Analyses made stale when the pass returns a different root.
    fn invalidates(&self) -> Analyses {
        Analyses::all()
    }

    /// Run over the tree rooted at `root`, returning the new root.
    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError>;
}

/// Run one pass with freshness checks, logging and bookkeeping.
pub fn apply_pass(
    pass: &mut dyn Pass,
    ctx: &mut FrontendContext,
    root: NodeId,
) -> Result<NodeId, PassError> {
    let stale = ctx.stale() & pass.reads();
    if !stale.is_empty() {
        return Err(PassError::StaleAnalysis {
            pass: pass.name().to_owned(),
            analyses: stale,
        });
    }

    let span = tracing::debug_span!("pass", name = pass.name());
    let _guard = span.enter();
    let errors_before = ctx.reported_errors();

    let new_root = pass.run(ctx, root)?;

    let changed = new_root != root;
    if changed {
        ctx.mark_stale(pass.invalidates());
    }
    ctx.mark_fresh(pass.populates());
    debug!(
        changed,
        new_errors = ctx.reported_errors().saturating_sub(errors_before),
        "pass finished"
    );
    Ok(new_root)
}

/// A sequence of passes.
pub struct PassManager {
    name: String,
    passes: Vec<Box<dyn Pass>>,
    stop_on_error: bool,
}

impl PassManager {
    pub fn new(name: impl Into<String>) -> Self {
        PassManager {
            name: name.into(),
            passes: Vec::new(),
            stop_on_error: false,
        }
    }

    #[must_use]
    pub fn with(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn add(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Abort the rest of the sequence after a pass that reported errors.
    pub fn set_stop_on_error(&mut self, stop: bool) {
        self.stop_on_error = stop;
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Pass for PassManager {
    fn name(&self) -> &str {
        &self.name
    }

    // Inner passes do their own bookkeeping.
    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let mut root = root;
        for pass in &mut self.passes {
            let errors_before = ctx.reported_errors();
            root = apply_pass(pass.as_mut(), ctx, root)?;
            if self.stop_on_error && ctx.reported_errors() > errors_before {
                debug!(pass = pass.name(), "stopping after errors");
                break;
            }
        }
        Ok(root)
    }
}

/// Default iteration cap of [`PassRepeated`].
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Repeat a sequence until an iteration neither changes the root nor adds
/// errors.
pub struct PassRepeated {
    name: String,
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
    stop_on_error: bool,
}

impl PassRepeated {
    pub fn new(name: impl Into<String>) -> Self {
        PassRepeated {
            name: name.into(),
            passes: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stop_on_error: false,
        }
    }

    #[must_use]
    pub fn with(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn set_stop_on_error(&mut self, stop: bool) {
        self.stop_on_error = stop;
    }
}

impl Pass for PassRepeated {
    fn name(&self) -> &str {
        &self.name
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let mut root = root;
        let mut last_changed = String::new();
        for iteration in 0..self.max_iterations {
            let iteration_start = root;
            let errors_before = ctx.error_count();
            for pass in &mut self.passes {
                let pass_errors = ctx.reported_errors();
                let new_root = apply_pass(pass.as_mut(), ctx, root)?;
                if new_root != root {
                    last_changed = pass.name().to_owned();
                }
                root = new_root;
                if self.stop_on_error && ctx.reported_errors() > pass_errors {
                    return Ok(root);
                }
            }
            // A duplicate of an earlier error is not progress.
            if root == iteration_start && ctx.error_count() == errors_before {
                debug!(iterations = iteration + 1, "fixpoint reached");
                return Ok(root);
            }
        }
        Err(PassError::IterationLimit {
            pass: self.name.clone(),
            limit: self.max_iterations,
            last_changed,
        })
    }
}

#[cfg(test)]
mod tests;
