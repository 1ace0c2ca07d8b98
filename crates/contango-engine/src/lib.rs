//! Contango valuation engine.
//!
//! Values contracts written in a stochastic-calculus expression language by
//! decomposing them into a persisted dependency graph of calls and
//! evaluating the calls leaves-first:
//!
//! ```text
//!   ContractModule (parsed tree)
//!         |
//!         v
//!   generator ──► CallRequirement / CallDependencies / CallDependents
//!         |        CallLink (closed source-order chain)
//!         v
//!   scheduler ──► execution order, leaves first
//!         |
//!         v
//!   CallEvaluator (external) ──► CallResult per call, root's value out
//! ```
//!
//! Market simulation runs beside the graph: `fixing_dates` resolves the
//! calendar a contract observes, `simulation` drives a pluggable price
//! process over it, and evaluators read the persisted paths back by
//! (run, market, date).
//!
//! All persistence goes through the write-once store traits in
//! `contango-traits`; the engine owns no storage of its own.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod expr;
pub mod fixing_dates;
pub mod generator;
pub mod market_names;
pub mod scheduler;
pub mod simulation;
pub mod values;

pub use engine::{CallEvaluator, ValuationEngine, ValuationEngineBuilder};
pub use error::EngineError;
pub use expr::{BinOp, ContractModule, Expr, FunctionDef};
pub use fixing_dates::{link_order, list_fixing_dates};
pub use generator::generate_dependency_graph;
pub use market_names::list_market_names;
pub use scheduler::{execution_order, ExecutionOrder};
pub use simulation::generate_simulated_prices;
pub use values::dependency_values;
