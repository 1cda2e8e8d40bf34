//! # Kanon
//!
//! **Declarative HTTP contract testing**
//!
//! Kanon describes an API exchange as data and checks it:
//!
//! - **Models** - bind JSON objects to named, typed field schemas
//! - **Predicates** - collection checks such as size, uniqueness and
//!   "every element matches"
//! - **Composable specs** - request defaults and response expectations
//!   that layer from suite to route to call
//! - **Executor** - sends the call, validates the response, reports every
//!   failure at once and binds the body
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kanon::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("kanon.toml")?
//!         .with_env_prefix("KANON")
//!         .load()?;
//!     let suite = Suite::from_config(&config)?;
//!
//!     let users = ResponseSpec::builder()
//!         .status(200)
//!         .body("data", Predicate::size(6))
//!         .body("data", Predicate::unique_count("email", 6))
//!         .build()?;
//!
//!     suite.run(Call::get("/users?page=2"), &users).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! ```text
//! kanon-core       models, predicates, request/response specs
//! kanon-client     executor, transports, reporters
//! kanon-config     layered suite configuration
//! kanon-telemetry  logging and metrics
//! ```

#![doc(html_root_url = "https://docs.rs/kanon/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod suite;

// Re-export core types
pub use kanon_core as core;

// Re-export executor types
pub use kanon_client as client;

// Re-export configuration types
pub use kanon_config as config;

// Re-export telemetry types
pub use kanon_telemetry as telemetry;

pub use suite::{Suite, SuiteError};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use kanon::prelude::*;
/// ```
pub mod prelude {
    pub use kanon_core::{
        bind, bind_as, serialize, BodyRule, ContentType, ElementPredicate, ExecutionResult,
        FieldType, JsonPath, LogDetail, Model, ModelSchema, Predicate, RequestSpec, ResponseSpec,
        ValidationFailure,
    };

    pub use kanon_client::{
        Call, ContractError, ContractExecutor, MockTransport, RecordingReporter, ReqwestTransport,
    };

    pub use kanon_config::{ConfigLoader, KanonConfig};

    pub use crate::{Suite, SuiteError};
}
