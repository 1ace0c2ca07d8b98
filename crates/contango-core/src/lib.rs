//! # Contango Core
//!
//! Core identifier and record types for the Contango valuation engine.
//!
//! A submitted contract is decomposed into a persisted graph of *calls*:
//! separately schedulable units of the contract's expression tree. This crate
//! defines the durable records that make up that graph:
//!
//! - [`call::CallRequirement`]: a call's un-evaluated source and context
//! - [`call::CallDependencies`] / [`call::CallDependents`]: the two inverse
//!   adjacency relations over call ids
//! - [`call::CallLink`]: the source-order traversal chain over all calls
//! - [`call::CallResult`]: a call's computed value, written exactly once
//! - [`market`]: calibration, simulation, and simulated-price records
//!
//! All records are append-only: once written they are never modified, which
//! is what lets independent workers share one contract's graph with no
//! coordination beyond the stores themselves.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call;
pub mod ids;
pub mod market;

pub use call::{
    CallDependencies, CallDependents, CallLink, CallRequirement, CallResult,
    ContractSpecification, DependencyGraph, ResultValue,
};
pub use ids::{CallId, MarketName, SimulationId};
pub use market::{
    CalibrationParams, MarketCalibration, MarketSimulation, SimulatedPrice, SimulatedPriceKey,
};
