//! Market calibration, simulation, and simulated-price records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{MarketName, SimulationId};

// =============================================================================
// CALIBRATION
// =============================================================================

/// Per-market parameters of a stochastic price model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Last observed spot price.
    pub last_price: f64,
    /// Annualized volatility.
    pub sigma: f64,
}

/// Model parameters for a stochastic process, keyed by market name.
///
/// Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCalibration {
    /// Calibration id.
    pub id: SimulationId,
    /// Parameters per market. Ordered map so rendering is stable.
    pub params: BTreeMap<MarketName, CalibrationParams>,
}

impl MarketCalibration {
    /// Register a calibration under a fresh id.
    pub fn new(params: BTreeMap<MarketName, CalibrationParams>) -> Self {
        Self {
            id: SimulationId::new(),
            params,
        }
    }

    /// Look up the parameters for a market.
    pub fn for_market(&self, market: &MarketName) -> Option<&CalibrationParams> {
        self.params.get(market)
    }
}

// =============================================================================
// SIMULATION
// =============================================================================

/// The configuration of one Monte Carlo simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSimulation {
    /// Simulation id.
    pub id: SimulationId,
    /// Calibration driving the run.
    pub calibration_id: SimulationId,
    /// Markets requiring simulated prices.
    pub market_names: Vec<MarketName>,
    /// Calendar dates requiring simulated prices.
    pub fixing_dates: Vec<NaiveDate>,
    /// Present time of the run; paths evolve forward from here.
    pub observation_date: NaiveDate,
    /// Number of Monte Carlo paths per price.
    pub path_count: usize,
    /// RNG seed, so a run can be replayed deterministically.
    pub seed: u64,
}

// =============================================================================
// SIMULATED PRICE
// =============================================================================

/// Key of one persisted simulated price: (run, market, date).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPriceKey {
    /// The simulation run.
    pub simulation_id: SimulationId,
    /// The market.
    pub market_name: MarketName,
    /// The fixing date.
    pub fixing_date: NaiveDate,
}

/// Persisted output of a price process: one price per path for one
/// (market, fixing date) pair of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPrice {
    /// (run, market, date) key.
    pub key: SimulatedPriceKey,
    /// Simulated prices, one entry per path.
    pub prices: Vec<f64>,
}
