//! # Contango Process
//!
//! Pluggable stochastic price processes.
//!
//! A price process is resolved by name from a [`ProcessRegistry`] and driven
//! to produce Monte Carlo price paths for every requested market and fixing
//! date. The crate provides:
//!
//! - [`PriceProcess`]: the simulation capability itself
//! - [`ProcessModule`]: a named plugin that may expose that capability
//! - [`ProcessRegistry`]: name-based resolution with distinct failure
//!   reasons for "no such module" and "module lacks the capability"
//! - [`BlackScholesPriceProcess`]: the default geometric-Brownian-motion
//!   implementation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blackscholes;
pub mod error;
pub mod registry;

use chrono::NaiveDate;
use contango_core::{MarketCalibration, MarketName};

pub use blackscholes::BlackScholesPriceProcess;
pub use error::{ProcessError, ResolutionFailure};
pub use registry::{ProcessModule, ProcessRegistry, DEFAULT_PRICE_PROCESS_NAME};

/// One simulated price path produced by a process: the prices of one market
/// at one fixing date, one entry per Monte Carlo path.
#[derive(Debug, Clone)]
pub struct SimulatedPricePath {
    /// The simulated market.
    pub market_name: MarketName,
    /// The fixing date the prices apply to.
    pub fixing_date: NaiveDate,
    /// Simulated prices; length is exactly the requested path count.
    pub prices: Vec<f64>,
}

/// The simulation capability of a pluggable stochastic model.
///
/// Implementations produce a finite sequence covering the full cross-product
/// of requested markets and fixing dates, each path holding exactly
/// `path_count` entries. Given the same calibration and seed a process may
/// replay deterministically; determinism across restarts is an
/// implementation choice, not a guarantee of this contract.
pub trait PriceProcess: Send + Sync {
    /// Simulate future prices for every (market, fixing date) pair.
    fn simulate_future_prices(
        &self,
        market_names: &[MarketName],
        fixing_dates: &[NaiveDate],
        observation_date: NaiveDate,
        path_count: usize,
        calibration: &MarketCalibration,
        seed: u64,
    ) -> Result<Vec<SimulatedPricePath>, ProcessError>;
}
