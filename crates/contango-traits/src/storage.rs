//! Storage traits for the call graph and market records.
//!
//! These traits define interfaces for storage backends:
//! - [`CallRequirementStore`] / [`CallResultStore`] / [`CallLinkStore`]:
//!   write-once point stores
//! - [`CallDependenciesStore`]: write-once per call id
//! - [`CallDependentsStore`]: the one append store - a dependents list grows
//!   as parents discover a shared child
//! - [`MarketCalibrationStore`] / [`MarketSimulationStore`] /
//!   [`SimulatedPriceStore`]: market-side records
//!
//! Storage implementations are EXTENSIONS (e.g. in-memory, embedded KV,
//! SQL). The append-only discipline gives at-most-one-writer-per-id
//! semantics: `create` refuses a second writer with
//! [`StoreError::AlreadyExists`], and reads always observe the first
//! committed value.

use std::sync::Arc;

use contango_core::{
    CallDependencies, CallDependents, CallId, CallLink, CallRequirement, CallResult,
    MarketCalibration, MarketSimulation, SimulatedPrice, SimulatedPriceKey, SimulationId,
};

use crate::error::StoreError;

// =============================================================================
// CALL GRAPH STORES
// =============================================================================

/// Call requirement storage (write-once per id).
pub trait CallRequirementStore: Send + Sync {
    /// Get a requirement by call id.
    fn get(&self, id: &CallId) -> Result<Option<CallRequirement>, StoreError>;

    /// Create a requirement. Fails with `AlreadyExists` for a second writer.
    fn create(&self, requirement: CallRequirement) -> Result<(), StoreError>;
}

/// Call dependencies storage (write-once per id).
pub trait CallDependenciesStore: Send + Sync {
    /// Get the dependencies of a call.
    fn get(&self, id: &CallId) -> Result<Option<CallDependencies>, StoreError>;

    /// Record a call's full ordered dependency list, exactly once.
    fn create(&self, dependencies: CallDependencies) -> Result<(), StoreError>;
}

/// Call dependents storage (grow-only).
pub trait CallDependentsStore: Send + Sync {
    /// Get the dependents of a call.
    fn get(&self, id: &CallId) -> Result<Option<CallDependents>, StoreError>;

    /// Append one dependent to a call's dependents list.
    ///
    /// Must behave as a monotonic set union: concurrent appends from
    /// different parents may not lose each other, and appending an id that
    /// is already present is a no-op.
    fn append(&self, id: &CallId, dependent: CallId) -> Result<(), StoreError>;
}

/// Call link storage (write-once per id).
pub trait CallLinkStore: Send + Sync {
    /// Get the link following a call in source order.
    fn get(&self, id: &CallId) -> Result<Option<CallLink>, StoreError>;

    /// Create a link. Fails with `AlreadyExists` for a second writer.
    fn create(&self, link: CallLink) -> Result<(), StoreError>;
}

/// Call result storage (write-once per id).
///
/// The presence of a result is the sole completion signal for its call, so a
/// worker racing to compute the same call must treat `AlreadyExists` as
/// "discard mine", never overwrite.
pub trait CallResultStore: Send + Sync {
    /// Get the result of a call.
    fn get(&self, id: &CallId) -> Result<Option<CallResult>, StoreError>;

    /// Record a call's result, exactly once.
    fn create(&self, result: CallResult) -> Result<(), StoreError>;
}

// =============================================================================
// MARKET STORES
// =============================================================================

/// Market calibration storage.
pub trait MarketCalibrationStore: Send + Sync {
    /// Get a calibration by id.
    fn get(&self, id: &SimulationId) -> Result<Option<MarketCalibration>, StoreError>;

    /// Register a calibration.
    fn create(&self, calibration: MarketCalibration) -> Result<(), StoreError>;
}

/// Market simulation storage.
pub trait MarketSimulationStore: Send + Sync {
    /// Get a simulation configuration by id.
    fn get(&self, id: &SimulationId) -> Result<Option<MarketSimulation>, StoreError>;

    /// Register a simulation configuration.
    fn create(&self, simulation: MarketSimulation) -> Result<(), StoreError>;
}

/// Simulated price storage (write-once per key).
pub trait SimulatedPriceStore: Send + Sync {
    /// Get the simulated price paths for a (run, market, date) key.
    fn get(&self, key: &SimulatedPriceKey) -> Result<Option<SimulatedPrice>, StoreError>;

    /// Persist one simulated price record.
    fn create(&self, price: SimulatedPrice) -> Result<(), StoreError>;
}

// =============================================================================
// COMBINED STORAGE ADAPTER
// =============================================================================

/// Combined storage adapter, injected into the engine.
#[derive(Clone)]
pub struct StorageAdapter {
    /// Call requirement store
    pub call_requirements: Arc<dyn CallRequirementStore>,
    /// Call dependencies store
    pub call_dependencies: Arc<dyn CallDependenciesStore>,
    /// Call dependents store
    pub call_dependents: Arc<dyn CallDependentsStore>,
    /// Call link store
    pub call_links: Arc<dyn CallLinkStore>,
    /// Call result store
    pub call_results: Arc<dyn CallResultStore>,
    /// Market calibration store
    pub market_calibrations: Arc<dyn MarketCalibrationStore>,
    /// Market simulation store
    pub market_simulations: Arc<dyn MarketSimulationStore>,
    /// Simulated price store
    pub simulated_prices: Arc<dyn SimulatedPriceStore>,
}
