//! Engine error types.

use contango_core::CallId;
use contango_process::ProcessError;
use contango_traits::StoreError;
use thiserror::Error;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed source encountered during decomposition
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Identifier not found during decomposition
    #[error("unresolved name '{name}' in '{context}'")]
    UnresolvedName {
        /// The name that could not be resolved.
        name: String,
        /// Rendered source of the originating sub-expression.
        context: String,
    },

    /// Construct the decomposer cannot handle
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Decomposition exceeded the configured call budget.
    ///
    /// Raised instead of looping forever on unbounded recursive contract
    /// definitions.
    #[error("call budget exceeded: contract decomposed into more than {0} calls")]
    CallBudgetExceeded(usize),

    /// Named price process could not be resolved, or failed while simulating
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// An internal invariant the scheduler should have guaranteed was
    /// violated. Fatal, never user-facing.
    #[error("graph consistency violation: {0}")]
    GraphConsistency(String),

    /// Storage error, propagated and never interpreted
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The external evaluator failed for one call
    #[error("evaluation failed for call {call_id}: {reason}")]
    Evaluation {
        /// The failing call.
        call_id: CallId,
        /// What the evaluator reported.
        reason: String,
    },
}
