//! In-memory storage for the Contango valuation engine.
//!
//! [`MemoryStore`] implements every store trait over concurrent maps. It is
//! the backend used by the engine's tests and is suitable for single-process
//! evaluation; durable backends live in their own extension crates behind
//! the same traits.
//!
//! Write-once semantics are enforced with atomic insert-if-absent: the first
//! writer wins and later writers get [`StoreError::AlreadyExists`]. The
//! dependents store is the one grow-only structure; its append takes the
//! entry lock and performs a set union, so concurrent parents discovering a
//! shared child cannot lose each other's writes.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use contango_core::{
    CallDependencies, CallDependents, CallId, CallLink, CallRequirement, CallResult,
    MarketCalibration, MarketSimulation, SimulatedPrice, SimulatedPriceKey, SimulationId,
};
use contango_traits::storage::{
    CallDependenciesStore, CallDependentsStore, CallLinkStore, CallRequirementStore,
    CallResultStore, MarketCalibrationStore, MarketSimulationStore, SimulatedPriceStore,
    StorageAdapter,
};
use contango_traits::StoreError;

/// Concurrent in-memory implementation of all Contango store traits.
#[derive(Default)]
pub struct MemoryStore {
    call_requirements: DashMap<CallId, CallRequirement>,
    call_dependencies: DashMap<CallId, CallDependencies>,
    call_dependents: DashMap<CallId, CallDependents>,
    call_links: DashMap<CallId, CallLink>,
    call_results: DashMap<CallId, CallResult>,
    market_calibrations: DashMap<SimulationId, MarketCalibration>,
    market_simulations: DashMap<SimulationId, MarketSimulation>,
    simulated_prices: DashMap<SimulatedPriceKey, SimulatedPrice>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a [`StorageAdapter`] with every handle backed by this store.
    pub fn adapter(self: &Arc<Self>) -> StorageAdapter {
        StorageAdapter {
            call_requirements: self.clone(),
            call_dependencies: self.clone(),
            call_dependents: self.clone(),
            call_links: self.clone(),
            call_results: self.clone(),
            market_calibrations: self.clone(),
            market_simulations: self.clone(),
            simulated_prices: self.clone(),
        }
    }

    /// Number of persisted call requirements.
    pub fn call_count(&self) -> usize {
        self.call_requirements.len()
    }

    /// Number of persisted simulated prices.
    pub fn simulated_price_count(&self) -> usize {
        self.simulated_prices.len()
    }
}

fn create_once<K, V>(map: &DashMap<K, V>, key: K, value: V, what: &str) -> Result<(), StoreError>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
{
    match map.entry(key) {
        Entry::Occupied(e) => Err(StoreError::AlreadyExists(format!("{}: {:?}", what, e.key()))),
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
    }
}

impl CallRequirementStore for MemoryStore {
    fn get(&self, id: &CallId) -> Result<Option<CallRequirement>, StoreError> {
        Ok(self.call_requirements.get(id).map(|r| r.clone()))
    }

    fn create(&self, requirement: CallRequirement) -> Result<(), StoreError> {
        create_once(
            &self.call_requirements,
            requirement.id,
            requirement,
            "call requirement",
        )
    }
}

impl CallDependenciesStore for MemoryStore {
    fn get(&self, id: &CallId) -> Result<Option<CallDependencies>, StoreError> {
        Ok(self.call_dependencies.get(id).map(|r| r.clone()))
    }

    fn create(&self, dependencies: CallDependencies) -> Result<(), StoreError> {
        create_once(
            &self.call_dependencies,
            dependencies.call_id,
            dependencies,
            "call dependencies",
        )
    }
}

impl CallDependentsStore for MemoryStore {
    fn get(&self, id: &CallId) -> Result<Option<CallDependents>, StoreError> {
        Ok(self.call_dependents.get(id).map(|r| r.clone()))
    }

    fn append(&self, id: &CallId, dependent: CallId) -> Result<(), StoreError> {
        // Entry lock makes the read-check-push atomic per call id.
        let mut entry = self.call_dependents.entry(*id).or_insert_with(|| CallDependents {
            call_id: *id,
            dependents: Vec::new(),
        });
        if !entry.dependents.contains(&dependent) {
            entry.dependents.push(dependent);
        }
        Ok(())
    }
}

impl CallLinkStore for MemoryStore {
    fn get(&self, id: &CallId) -> Result<Option<CallLink>, StoreError> {
        Ok(self.call_links.get(id).map(|r| r.clone()))
    }

    fn create(&self, link: CallLink) -> Result<(), StoreError> {
        create_once(&self.call_links, link.id, link, "call link")
    }
}

impl CallResultStore for MemoryStore {
    fn get(&self, id: &CallId) -> Result<Option<CallResult>, StoreError> {
        Ok(self.call_results.get(id).map(|r| r.clone()))
    }

    fn create(&self, result: CallResult) -> Result<(), StoreError> {
        create_once(&self.call_results, result.call_id, result, "call result")
    }
}

impl MarketCalibrationStore for MemoryStore {
    fn get(&self, id: &SimulationId) -> Result<Option<MarketCalibration>, StoreError> {
        Ok(self.market_calibrations.get(id).map(|r| r.clone()))
    }

    fn create(&self, calibration: MarketCalibration) -> Result<(), StoreError> {
        create_once(
            &self.market_calibrations,
            calibration.id,
            calibration,
            "market calibration",
        )
    }
}

impl MarketSimulationStore for MemoryStore {
    fn get(&self, id: &SimulationId) -> Result<Option<MarketSimulation>, StoreError> {
        Ok(self.market_simulations.get(id).map(|r| r.clone()))
    }

    fn create(&self, simulation: MarketSimulation) -> Result<(), StoreError> {
        create_once(
            &self.market_simulations,
            simulation.id,
            simulation,
            "market simulation",
        )
    }
}

impl SimulatedPriceStore for MemoryStore {
    fn get(&self, key: &SimulatedPriceKey) -> Result<Option<SimulatedPrice>, StoreError> {
        Ok(self.simulated_prices.get(key).map(|r| r.clone()))
    }

    fn create(&self, price: SimulatedPrice) -> Result<(), StoreError> {
        create_once(&self.simulated_prices, price.key.clone(), price, "simulated price")
    }
}
