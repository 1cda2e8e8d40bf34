//! Layered configuration for Kanon contract-test suites.
//!
//! This crate provides:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → files → env), merged key by key
//!
//! # Example
//!
//! ```no_run
//! use kanon_config::ConfigLoader;
//!
//! # fn main() -> Result<(), kanon_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("kanon.toml")?
//!     .with_env_prefix("KANON")
//!     .load()?;
//!
//! let base = config.request_spec()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [suite]
//! name = "reqres"
//! environment = "staging"
//!
//! [client]
//! base_url = "https://reqres.in"
//! base_path = "/api"
//! timeout_ms = 10000
//! content_type = "json"
//! log = ["uri", "status"]
//!
//! [client.headers]
//! x-api-key = "reqres-free-v1"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `KANON__CLIENT__BASE_URL=https://staging.reqres.in`
//! - `KANON__CLIENT__HEADERS__X_API_KEY=secret` (sets `x-api-key`)
//! - `KANON__TELEMETRY__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::KanonConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
