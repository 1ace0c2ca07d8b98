//! Call graph records.
//!
//! A contract decomposes into *calls*: separately schedulable units of its
//! expression tree. Four record families describe the graph:
//!
//! - [`CallRequirement`]: what a call evaluates (its un-evaluated source)
//! - [`CallDependencies`] and [`CallDependents`]: the dependency partial
//!   order and its exact structural inverse
//! - [`CallLink`]: a closed, source-order chain over all calls, distinct
//!   from the dependency order
//! - [`CallResult`]: a call's value once computed; its presence is the sole
//!   completion signal for the call

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::CallId;

// =============================================================================
// CONTRACT SPECIFICATION
// =============================================================================

/// A submitted contract specification.
///
/// Created once at submission time and never modified. Its id is also the
/// root call id of the dependency graph generated from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSpecification {
    /// Specification id, doubling as the root call id.
    pub id: CallId,
    /// The contract's source text in the stochastic-calculus language.
    pub source_text: String,
}

impl ContractSpecification {
    /// Register a new specification under a fresh id.
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            id: CallId::new(),
            source_text: source_text.into(),
        }
    }
}

// =============================================================================
// CALL REQUIREMENT
// =============================================================================

/// One decomposed sub-expression of a contract, including the root.
///
/// Written once by the graph generator; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequirement {
    /// Call id.
    pub id: CallId,
    /// The call's un-evaluated source in canonical rendered form.
    pub dsl_source: String,
    /// Fixing date governing the call, when its expression is date-bearing.
    pub effective_date: Option<NaiveDate>,
}

// =============================================================================
// DEPENDENCY RELATIONS
// =============================================================================

/// The ordered dependencies of one call.
///
/// Written exactly once, at the moment the call's children are known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallDependencies {
    /// Owning call id.
    pub call_id: CallId,
    /// Ids this call's evaluation requires, in discovery order.
    pub dependencies: Vec<CallId>,
}

/// The dependents of one call: the exact inverse of [`CallDependencies`].
///
/// Unlike dependencies, a dependents list grows across writes: each new
/// parent that discovers a shared child appends itself. Appends are a
/// monotonic set union, never a last-writer-wins replace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallDependents {
    /// Owning call id.
    pub call_id: CallId,
    /// Ids whose evaluation requires this call.
    pub dependents: Vec<CallId>,
}

// =============================================================================
// CALL LINK CHAIN
// =============================================================================

/// One link of the closed, source-order traversal chain over all calls.
///
/// Starting from the root, following `next_call_id` visits every call in
/// the contract exactly once and returns to the start. This ordering
/// reflects the contract's temporal (document) structure, independent of
/// the dependency partial order, and is what fixing-date resolution walks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLink {
    /// Link owner.
    pub id: CallId,
    /// The next call in source order.
    pub next_call_id: CallId,
}

// =============================================================================
// CALL RESULT
// =============================================================================

/// A computed call value: a scalar or one value per Monte Carlo path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultValue {
    /// A single deterministic value.
    Scalar(f64),
    /// One value per simulated path; length equals the run's path count.
    Paths(Vec<f64>),
}

impl ResultValue {
    /// Mean across paths (the scalar itself for scalars).
    pub fn mean(&self) -> f64 {
        match self {
            ResultValue::Scalar(v) => *v,
            ResultValue::Paths(p) if p.is_empty() => 0.0,
            ResultValue::Paths(p) => p.iter().sum::<f64>() / p.len() as f64,
        }
    }

    /// Number of paths carried (1 for scalars).
    pub fn path_count(&self) -> usize {
        match self {
            ResultValue::Scalar(_) => 1,
            ResultValue::Paths(p) => p.len(),
        }
    }
}

/// A call's computed value.
///
/// Written exactly once, after every dependency of the call has a result.
/// A redundant second computation of the same call must be discarded, never
/// overwrite this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    /// The evaluated call.
    pub call_id: CallId,
    /// The computed value.
    pub result_value: ResultValue,
}

// =============================================================================
// DEPENDENCY GRAPH SUMMARY
// =============================================================================

/// Summary of one generated dependency graph.
///
/// Recorded by the graph generator so that scheduling can start from the
/// leaves without re-deriving them from the relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Root call id (the contract specification's id).
    pub root_id: CallId,
    /// Total number of calls in the graph.
    pub call_count: usize,
    /// Calls with zero dependencies, in discovery order.
    pub leaf_ids: Vec<CallId>,
}
