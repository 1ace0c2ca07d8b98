//! The valuation engine facade.
//!
//! Ties the pieces together behind one injected [`StorageAdapter`] and
//! [`ProcessRegistry`]: contract registration, graph generation, execution
//! ordering, fixing-date resolution, simulation, and the evaluation loop.
//! Expression evaluation itself stays behind the [`CallEvaluator`] seam -
//! the engine decides *when* a call runs and with which inputs, never *how*
//! its source is computed.

use std::collections::HashMap;

use chrono::NaiveDate;
use contango_core::{
    CallId, CallRequirement, CallResult, ContractSpecification, DependencyGraph, MarketName,
    MarketSimulation, ResultValue, SimulationId,
};
use contango_process::ProcessRegistry;
use contango_traits::{EngineConfig, StorageAdapter, StoreError};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::expr::ContractModule;
use crate::fixing_dates;
use crate::generator;
use crate::market_names;
use crate::scheduler::{self, ExecutionOrder};
use crate::simulation;
use crate::values;

// =============================================================================
// CALL EVALUATOR SEAM
// =============================================================================

/// Computes the value of one call from its stored source and the values of
/// its dependencies.
///
/// Implementations capture whatever else they need (simulated prices, a
/// simulation id) at construction time. A returned error string is wrapped
/// into [`EngineError::Evaluation`] against the failing call.
pub trait CallEvaluator: Send + Sync {
    /// Evaluate one call.
    fn evaluate(
        &self,
        requirement: &CallRequirement,
        dependency_values: &HashMap<CallId, ResultValue>,
    ) -> Result<ResultValue, String>;
}

// =============================================================================
// ENGINE
// =============================================================================

/// The valuation engine.
///
/// Construct via [`ValuationEngine::builder`].
pub struct ValuationEngine {
    storage: StorageAdapter,
    processes: ProcessRegistry,
    config: EngineConfig,
}

impl ValuationEngine {
    /// Start building an engine over a storage adapter.
    pub fn builder(storage: StorageAdapter) -> ValuationEngineBuilder {
        ValuationEngineBuilder::new(storage)
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a contract specification under a fresh id.
    ///
    /// The returned specification's id doubles as the root call id of any
    /// graph generated from it. The engine consumes contracts as parsed
    /// trees; keeping the raw source alongside is the submitting layer's
    /// concern.
    pub fn register_contract_specification(
        &self,
        source_text: impl Into<String>,
    ) -> ContractSpecification {
        let spec = ContractSpecification::new(source_text);
        info!(id = %spec.id, "contract specification registered");
        spec
    }

    /// Decompose a parsed contract into its persisted call graph.
    pub fn generate_dependency_graph(
        &self,
        root_id: CallId,
        module: &ContractModule,
    ) -> Result<DependencyGraph, EngineError> {
        generator::generate_dependency_graph(root_id, module, &self.storage, &self.config)
    }

    /// Execution order over a generated graph, leaves first.
    pub fn execution_order(&self, graph: &DependencyGraph) -> ExecutionOrder<'_> {
        scheduler::execution_order(
            &graph.leaf_ids,
            &*self.storage.call_dependents,
            &*self.storage.call_dependencies,
        )
    }

    /// The distinct fixing dates of a generated graph, sorted ascending.
    pub fn list_fixing_dates(&self, root_id: CallId) -> Result<Vec<NaiveDate>, EngineError> {
        fixing_dates::list_fixing_dates(
            root_id,
            &*self.storage.call_links,
            &*self.storage.call_requirements,
        )
    }

    /// The distinct market names a parsed contract observes.
    pub fn list_market_names(&self, module: &ContractModule) -> Vec<MarketName> {
        market_names::list_market_names(module)
    }

    /// The computed values of a call's dependencies, keyed by call id.
    pub fn dependency_values(
        &self,
        call_id: CallId,
    ) -> Result<HashMap<CallId, ResultValue>, EngineError> {
        values::dependency_values(
            call_id,
            &*self.storage.call_dependencies,
            &*self.storage.call_results,
        )
    }

    /// Register a simulation run over a calibration, filling the path count
    /// and RNG seed from the engine's configuration.
    pub fn register_market_simulation(
        &self,
        calibration_id: SimulationId,
        market_names: Vec<MarketName>,
        fixing_dates: Vec<NaiveDate>,
        observation_date: NaiveDate,
    ) -> Result<MarketSimulation, EngineError> {
        let simulation = MarketSimulation {
            id: SimulationId::new(),
            calibration_id,
            market_names,
            fixing_dates,
            observation_date,
            path_count: self.config.path_count,
            seed: self.config.seed,
        };
        self.storage.market_simulations.create(simulation.clone())?;
        info!(
            id = %simulation.id,
            calibration = %simulation.calibration_id,
            path_count = simulation.path_count,
            "market simulation registered"
        );
        Ok(simulation)
    }

    /// Run the simulation registered under `simulation_id` with the engine's
    /// configured price process, persisting one record per (market, date).
    pub fn generate_simulated_prices(
        &self,
        simulation_id: &SimulationId,
    ) -> Result<usize, EngineError> {
        let simulation = self
            .storage
            .market_simulations
            .get(simulation_id)?
            .ok_or_else(|| StoreError::NotFound(format!("market simulation {simulation_id}")))?;
        let calibration = self
            .storage
            .market_calibrations
            .get(&simulation.calibration_id)?
            .ok_or_else(|| {
                StoreError::NotFound(format!("market calibration {}", simulation.calibration_id))
            })?;
        simulation::generate_simulated_prices(
            &calibration,
            &simulation,
            &self.processes,
            &self.config.price_process_name,
            &*self.storage.simulated_prices,
        )
    }

    /// Evaluate every call of a generated graph, leaves first, and return
    /// the root call's value.
    ///
    /// Results are write-once: if another worker already recorded a result
    /// for a call, this worker's redundant value is discarded and the first
    /// committed one stands.
    pub fn evaluate_contract(
        &self,
        graph: &DependencyGraph,
        evaluator: &dyn CallEvaluator,
    ) -> Result<ResultValue, EngineError> {
        for call_id in self.execution_order(graph) {
            let call_id = call_id?;
            if self.storage.call_results.get(&call_id)?.is_some() {
                continue;
            }

            let requirement = self.storage.call_requirements.get(&call_id)?.ok_or_else(|| {
                EngineError::GraphConsistency(format!("call {call_id} has no requirement record"))
            })?;
            let dependency_values = self.dependency_values(call_id)?;

            let result_value = evaluator
                .evaluate(&requirement, &dependency_values)
                .map_err(|reason| EngineError::Evaluation { call_id, reason })?;

            match self.storage.call_results.create(CallResult {
                call_id,
                result_value,
            }) {
                Ok(()) => {}
                Err(StoreError::AlreadyExists(_)) => {
                    warn!(call = %call_id, "result already recorded, discarding redundant value");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let root = self
            .storage
            .call_results
            .get(&graph.root_id)?
            .ok_or_else(|| {
                EngineError::GraphConsistency(format!(
                    "root call {} has no result after evaluation",
                    graph.root_id
                ))
            })?;
        Ok(root.result_value)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`ValuationEngine`].
pub struct ValuationEngineBuilder {
    storage: StorageAdapter,
    processes: ProcessRegistry,
    config: EngineConfig,
}

impl ValuationEngineBuilder {
    /// Start from a storage adapter with default processes and config.
    pub fn new(storage: StorageAdapter) -> Self {
        Self {
            storage,
            processes: ProcessRegistry::with_defaults(),
            config: EngineConfig::default(),
        }
    }

    /// Use a custom process registry.
    pub fn with_processes(mut self, processes: ProcessRegistry) -> Self {
        self.processes = processes;
        self
    }

    /// Use a custom engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine.
    pub fn build(self) -> ValuationEngine {
        ValuationEngine {
            storage: self.storage,
            processes: self.processes,
            config: self.config,
        }
    }
}
