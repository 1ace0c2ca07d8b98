//! Engine configuration.
//!
//! Configuration contains:
//! - Default price process selection
//! - Monte Carlo defaults (path count, seed)
//! - The decomposition call budget
//!
//! Configuration does NOT contain:
//! - Store connection parameters (the backend is resolved once at startup
//!   and injected as a concrete [`crate::StorageAdapter`])
//! - Contract or calibration data

use serde::{Deserialize, Serialize};

/// Default name of the pluggable price process.
pub const DEFAULT_PRICE_PROCESS_NAME: &str = "blackscholes";

/// Default number of Monte Carlo paths per simulated price.
pub const DEFAULT_PATH_COUNT: usize = 20_000;

/// Default ceiling on reified calls per contract.
pub const DEFAULT_MAX_CALLS: usize = 10_000;

/// Caller-constructed engine configuration.
///
/// Passed by reference into every operation; there is no process-wide
/// mutable singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the price process resolved for simulation runs.
    pub price_process_name: String,

    /// Number of Monte Carlo paths per simulated price.
    pub path_count: usize,

    /// RNG seed for simulation runs.
    pub seed: u64,

    /// Ceiling on the number of calls one contract may decompose into.
    ///
    /// Unbounded recursion in a contract definition generates fresh call
    /// sources forever; decomposition aborts once this budget is exceeded
    /// instead of never terminating.
    pub max_calls: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            price_process_name: DEFAULT_PRICE_PROCESS_NAME.to_string(),
            path_count: DEFAULT_PATH_COUNT,
            seed: 0,
            max_calls: DEFAULT_MAX_CALLS,
        }
    }
}
