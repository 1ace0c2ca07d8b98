//! Price process error types.

use contango_core::MarketName;
use thiserror::Error;

/// Why resolving a named process failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// No module is registered under the requested name.
    NotFound,
    /// A module is registered but does not expose the simulation capability.
    MissingCapability,
}

impl std::fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionFailure::NotFound => write!(f, "module not found"),
            ResolutionFailure::MissingCapability => write!(f, "simulation capability missing"),
        }
    }
}

/// Price process error type.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Named process could not be resolved. One error kind, two sub-reasons;
    /// a raw lookup failure never leaks out of the resolution mechanism.
    #[error("cannot resolve price process '{name}': {reason}")]
    Resolution {
        /// Requested process name.
        name: String,
        /// Which step of resolution failed.
        reason: ResolutionFailure,
    },

    /// The calibration carries no parameters for a requested market.
    #[error("no calibration parameters for market '{0}'")]
    MissingCalibration(MarketName),

    /// The simulation request itself is unusable.
    #[error("invalid simulation request: {0}")]
    InvalidRequest(String),
}
