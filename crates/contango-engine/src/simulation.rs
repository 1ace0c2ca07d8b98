//! Market simulation driver.
//!
//! Resolves the configured price process, hands it the simulation's market
//! names, fixing dates, and calibration, and persists each simulated path
//! vector under its (run, market, date) key. Prices are simulated for the
//! full cross product of markets and dates so any call can observe any
//! market on any of the contract's fixing dates.

use contango_core::{MarketCalibration, MarketSimulation, SimulatedPrice, SimulatedPriceKey};
use contango_process::ProcessRegistry;
use contango_traits::storage::SimulatedPriceStore;
use contango_traits::StoreError;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Run a price simulation and persist its output, returning the number of
/// price records written.
///
/// Re-running the same simulation id is idempotent: records already present
/// are left as first written and skipped.
pub fn generate_simulated_prices(
    calibration: &MarketCalibration,
    simulation: &MarketSimulation,
    registry: &ProcessRegistry,
    process_name: &str,
    prices: &dyn SimulatedPriceStore,
) -> Result<usize, EngineError> {
    let process = registry.resolve(process_name)?;
    let paths = process.simulate_future_prices(
        &simulation.market_names,
        &simulation.fixing_dates,
        simulation.observation_date,
        simulation.path_count,
        calibration,
        simulation.seed,
    )?;

    let mut written = 0;
    for path in paths {
        let key = SimulatedPriceKey {
            simulation_id: simulation.id,
            market_name: path.market_name.clone(),
            fixing_date: path.fixing_date,
        };
        match prices.create(SimulatedPrice {
            key: key.clone(),
            prices: path.prices,
        }) {
            Ok(()) => written += 1,
            Err(StoreError::AlreadyExists(_)) => {
                warn!(
                    simulation_id = %simulation.id,
                    market = %key.market_name,
                    date = %key.fixing_date,
                    "simulated price already recorded, keeping first value"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    debug!(
        simulation_id = %simulation.id,
        process = process_name,
        records = written,
        "simulation persisted"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contango_core::{CalibrationParams, MarketName, SimulationId};
    use contango_ext_memory::MemoryStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (MarketCalibration, MarketSimulation) {
        let mut params = BTreeMap::new();
        params.insert(
            MarketName::new("#1"),
            CalibrationParams {
                last_price: 10.0,
                sigma: 0.25,
            },
        );
        params.insert(
            MarketName::new("#2"),
            CalibrationParams {
                last_price: 20.0,
                sigma: 0.4,
            },
        );
        let calibration = MarketCalibration {
            id: SimulationId::new(),
            params,
        };
        let simulation = MarketSimulation {
            id: SimulationId::new(),
            calibration_id: calibration.id,
            market_names: vec![MarketName::new("#1"), MarketName::new("#2")],
            fixing_dates: vec![date(2011, 1, 1), date(2012, 1, 1)],
            observation_date: date(2011, 1, 1),
            path_count: 200,
            seed: 42,
        };
        (calibration, simulation)
    }

    #[test]
    fn persists_one_record_per_market_and_date() {
        let (calibration, simulation) = fixture();
        let store = Arc::new(MemoryStore::new());
        let registry = ProcessRegistry::with_defaults();

        let written =
            generate_simulated_prices(&calibration, &simulation, &registry, "blackscholes", &*store)
                .unwrap();
        assert_eq!(written, 4);

        for market in &simulation.market_names {
            for fixing_date in &simulation.fixing_dates {
                let key = SimulatedPriceKey {
                    simulation_id: simulation.id,
                    market_name: market.clone(),
                    fixing_date: *fixing_date,
                };
                let record = SimulatedPriceStore::get(&*store, &key).unwrap().unwrap();
                assert_eq!(record.prices.len(), simulation.path_count);
            }
        }
    }

    #[test]
    fn rerun_keeps_first_values_and_writes_nothing() {
        let (calibration, simulation) = fixture();
        let store = Arc::new(MemoryStore::new());
        let registry = ProcessRegistry::with_defaults();

        generate_simulated_prices(&calibration, &simulation, &registry, "blackscholes", &*store)
            .unwrap();
        let rerun =
            generate_simulated_prices(&calibration, &simulation, &registry, "blackscholes", &*store)
                .unwrap();
        assert_eq!(rerun, 0);
    }

    #[test]
    fn unknown_process_name_fails_before_any_write() {
        let (calibration, simulation) = fixture();
        let store = Arc::new(MemoryStore::new());
        let registry = ProcessRegistry::with_defaults();

        let result = generate_simulated_prices(
            &calibration,
            &simulation,
            &registry,
            "xblackscholes",
            &*store,
        );
        assert!(matches!(result, Err(EngineError::Process(_))));
        assert_eq!(store.simulated_price_count(), 0);
    }
}
