//! Core types for the refindex global reference index
//!
//! This crate provides the foundational abstractions shared across the
//! refindex workspace:
//!
//! - **Reference types**: definition keys, raw and normalized reference
//!   facts, ranked lookup summaries
//! - **Configuration**: system configuration management
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod error;
pub mod refs;

// Re-export main types for convenience
pub use config::{Config, StorageConfig};
pub use error::{Error, Result, ResultExt};
pub use refs::{
    Actor, DefKey, FileRefCount, NormalizedRef, RawRef, RefBatch, RefLocationsOptions,
    RefLocationsPage, RepoRefSummary,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
