//! Named price process resolution.
//!
//! Mirrors a two-step plugin lookup: find the module registered under the
//! requested name, then ask it for the simulation capability. Each step has
//! its own failure reason so "no such module" and "module without the
//! capability" stay distinguishable while surfacing as one error kind.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::blackscholes::BlackScholesPriceProcess;
use crate::error::{ProcessError, ResolutionFailure};
use crate::PriceProcess;

pub use contango_traits::config::DEFAULT_PRICE_PROCESS_NAME;

/// A named plugin that may expose the simulation capability.
pub trait ProcessModule: Send + Sync {
    /// The process implementation, if this module provides one.
    fn price_process(&self) -> Option<Arc<dyn PriceProcess>>;
}

/// Registry of named process modules.
#[derive(Default)]
pub struct ProcessRegistry {
    modules: DashMap<String, Arc<dyn ProcessModule>>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the default Black-Scholes process registered.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(DEFAULT_PRICE_PROCESS_NAME, Arc::new(BlackScholesModule));
        registry
    }

    /// Register a module under a name, replacing any previous registration.
    pub fn register(&self, name: impl Into<String>, module: Arc<dyn ProcessModule>) {
        let name = name.into();
        debug!(process = %name, "registered price process module");
        self.modules.insert(name, module);
    }

    /// Resolve a named process.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PriceProcess>, ProcessError> {
        let module = self
            .modules
            .get(name)
            .ok_or_else(|| ProcessError::Resolution {
                name: name.to_string(),
                reason: ResolutionFailure::NotFound,
            })?;
        module
            .price_process()
            .ok_or_else(|| ProcessError::Resolution {
                name: name.to_string(),
                reason: ResolutionFailure::MissingCapability,
            })
    }
}

struct BlackScholesModule;

impl ProcessModule for BlackScholesModule {
    fn price_process(&self) -> Option<Arc<dyn PriceProcess>> {
        Some(Arc::new(BlackScholesPriceProcess::new()))
    }
}
