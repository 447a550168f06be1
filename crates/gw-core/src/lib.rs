//! Core types, errors, and configuration for gitward.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Domain types ([`Rule`], [`Severity`], [`Ecosystem`], [`FrameworkDetection`])
//! - Configuration structures ([`Config`], [`WatchConfig`])
//! - Error types for configuration handling ([`ConfigError`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{CONFIG_FILE_NAME, Config, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_map_with_capacity, fx_hash_set};
pub use types::{
    Ecosystem, FrameworkDetection, FrameworkId, ParseSeverityError, Rule, Severity,
    normalize_pattern,
};
