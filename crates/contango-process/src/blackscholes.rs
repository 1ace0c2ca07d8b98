//! Black-Scholes (geometric Brownian motion) price process.
//!
//! Each market evolves independently under GBM with zero drift:
//! `S_t = S_0 * exp(sigma * W_t - sigma^2 * t / 2)`, with `t` measured in
//! ACT/365 years from the observation date. Brownian increments accumulate
//! across the sorted fixing dates, so the same path is internally consistent
//! from one date to the next. Dates at or before the observation date price
//! at the calibrated last price on every path.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use contango_core::{MarketCalibration, MarketName};

use crate::error::ProcessError;
use crate::{PriceProcess, SimulatedPricePath};

const DAYS_PER_YEAR: f64 = 365.0;

/// Geometric Brownian motion over the requested markets and dates.
#[derive(Debug, Clone, Default)]
pub struct BlackScholesPriceProcess;

impl BlackScholesPriceProcess {
    /// Create the process.
    pub fn new() -> Self {
        Self
    }

    fn year_fractions(observation_date: NaiveDate, dates: &[NaiveDate]) -> Vec<f64> {
        dates
            .iter()
            .map(|d| {
                let days = (*d - observation_date).num_days();
                if days <= 0 {
                    0.0
                } else {
                    days as f64 / DAYS_PER_YEAR
                }
            })
            .collect()
    }

    // Per-market seed, so adding a market does not disturb the paths of
    // the others.
    fn market_seed(seed: u64, market: &MarketName) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in market.as_str().bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        seed ^ h
    }
}

impl PriceProcess for BlackScholesPriceProcess {
    fn simulate_future_prices(
        &self,
        market_names: &[MarketName],
        fixing_dates: &[NaiveDate],
        observation_date: NaiveDate,
        path_count: usize,
        calibration: &MarketCalibration,
        seed: u64,
    ) -> Result<Vec<SimulatedPricePath>, ProcessError> {
        if path_count == 0 {
            return Err(ProcessError::InvalidRequest("path_count must be > 0".into()));
        }

        let mut dates: Vec<NaiveDate> = fixing_dates.to_vec();
        dates.sort_unstable();
        dates.dedup();

        let times = Self::year_fractions(observation_date, &dates);
        let mut out = Vec::with_capacity(market_names.len() * dates.len());

        for market in market_names {
            let params = calibration
                .for_market(market)
                .ok_or_else(|| ProcessError::MissingCalibration(market.clone()))?;

            let mut rng = StdRng::seed_from_u64(Self::market_seed(seed, market));

            // brownian[p] accumulates W_t for path p as we advance in time.
            let mut brownian = vec![0.0_f64; path_count];
            let mut prev_t = 0.0_f64;

            for (date, &t) in dates.iter().zip(times.iter()) {
                let dt = (t - prev_t).max(0.0);
                let sqrt_dt = dt.sqrt();
                let prices: Vec<f64> = brownian
                    .iter_mut()
                    .map(|w| {
                        if dt > 0.0 {
                            let z: f64 = rng.sample(StandardNormal);
                            *w += sqrt_dt * z;
                        }
                        params.last_price
                            * (params.sigma * *w - 0.5 * params.sigma * params.sigma * t).exp()
                    })
                    .collect();
                prev_t = prev_t.max(t);

                out.push(SimulatedPricePath {
                    market_name: market.clone(),
                    fixing_date: *date,
                    prices,
                });
            }
        }

        debug!(
            markets = market_names.len(),
            dates = dates.len(),
            path_count,
            "simulated future prices"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contango_core::CalibrationParams;
    use std::collections::BTreeMap;

    fn calibration(markets: &[(&str, f64, f64)]) -> MarketCalibration {
        let mut params = BTreeMap::new();
        for (name, last_price, sigma) in markets {
            params.insert(
                MarketName::new(*name),
                CalibrationParams {
                    last_price: *last_price,
                    sigma: *sigma,
                },
            );
        }
        MarketCalibration::new(params)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn covers_the_full_cross_product_with_exact_path_counts() {
        let process = BlackScholesPriceProcess::new();
        let markets = [MarketName::new("#1"), MarketName::new("#2")];
        let dates = [date(2011, 1, 1), date(2011, 6, 1), date(2012, 1, 1)];

        let paths = process
            .simulate_future_prices(
                &markets,
                &dates,
                date(2011, 1, 1),
                500,
                &calibration(&[("#1", 10.0, 0.2), ("#2", 20.0, 0.5)]),
                7,
            )
            .unwrap();

        assert_eq!(paths.len(), 6);
        for path in &paths {
            assert_eq!(path.prices.len(), 500);
            assert!(path.prices.iter().all(|p| *p > 0.0));
        }
    }

    #[test]
    fn observation_date_prices_at_last_price() {
        let process = BlackScholesPriceProcess::new();
        let paths = process
            .simulate_future_prices(
                &[MarketName::new("#1")],
                &[date(2011, 1, 1)],
                date(2011, 1, 1),
                10,
                &calibration(&[("#1", 10.0, 0.25)]),
                1,
            )
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].prices.iter().all(|p| (*p - 10.0).abs() < 1e-12));
    }

    #[test]
    fn replays_deterministically_for_a_fixed_seed() {
        let process = BlackScholesPriceProcess::new();
        let markets = [MarketName::new("#1")];
        let dates = [date(2012, 1, 1)];
        let cal = calibration(&[("#1", 10.0, 0.3)]);

        let a = process
            .simulate_future_prices(&markets, &dates, date(2011, 1, 1), 100, &cal, 42)
            .unwrap();
        let b = process
            .simulate_future_prices(&markets, &dates, date(2011, 1, 1), 100, &cal, 42)
            .unwrap();
        assert_eq!(a[0].prices, b[0].prices);

        let c = process
            .simulate_future_prices(&markets, &dates, date(2011, 1, 1), 100, &cal, 43)
            .unwrap();
        assert_ne!(a[0].prices, c[0].prices);
    }

    #[test]
    fn unknown_market_is_a_calibration_error() {
        let process = BlackScholesPriceProcess::new();
        let err = process
            .simulate_future_prices(
                &[MarketName::new("#9")],
                &[date(2012, 1, 1)],
                date(2011, 1, 1),
                10,
                &calibration(&[("#1", 10.0, 0.3)]),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingCalibration(_)));
    }

    #[test]
    fn martingale_mean_close_to_last_price() {
        let process = BlackScholesPriceProcess::new();
        let paths = process
            .simulate_future_prices(
                &[MarketName::new("#1")],
                &[date(2012, 1, 1)],
                date(2011, 1, 1),
                50_000,
                &calibration(&[("#1", 10.0, 0.2)]),
                9,
            )
            .unwrap();

        let prices = &paths[0].prices;
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        // Zero drift: E[S_t] = S_0. Loose tolerance for Monte Carlo noise.
        assert!((mean - 10.0).abs() < 0.1, "mean {mean} too far from 10");
    }
}
