//! # Contango Traits
//!
//! Trait definitions for the Contango valuation engine.
//!
//! This crate contains ONLY trait definitions and the configuration record.
//! Storage implementations live in separate extension crates.
//!
//! ## Module Structure
//!
//! - [`storage`]: repository traits for the call graph and market records,
//!   plus the [`storage::StorageAdapter`] bundle injected into the engine
//! - [`config`]: the caller-constructed engine configuration
//! - [`error`]: the shared store error type
//!
//! ## Dependency Injection
//!
//! The engine receives all store handles through an explicit, caller-built
//! adapter - there is no process-wide singleton:
//!
//! ```ignore
//! let storage = backend.adapter();
//! let engine = ValuationEngineBuilder::new(storage)
//!     .with_processes(registry)
//!     .build();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod storage;

pub use config::EngineConfig;
pub use error::StoreError;
pub use storage::StorageAdapter;
