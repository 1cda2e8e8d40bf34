//! # Kanon Client
//!
//! Executes declarative HTTP contracts.
//!
//! A [`ContractExecutor`] takes a [`RequestSpec`](kanon_core::RequestSpec),
//! a [`Call`] and a [`ResponseSpec`](kanon_core::ResponseSpec), sends the
//! request through an [`HttpTransport`], and either returns an
//! [`ExecutionResult`](kanon_core::ExecutionResult) or a [`ContractError`]
//! listing every broken expectation.
//!
//! ## Transports
//!
//! - [`ReqwestTransport`] - real network calls
//! - [`MockTransport`] - in-memory answers for tests
//!
//! ## Reporters
//!
//! Each contract is a step. [`ContractExecutor::step`] groups several
//! contracts, and nested steps, under one named step.
//!
//! - [`TracingReporter`] (default) - one `tracing` event per step
//! - [`RecordingReporter`] - keeps steps for inspection
//! - [`NoopReporter`] - discards steps
//!
//! ## Example
//!
//! ```ignore
//! use kanon_client::{Call, ContractExecutor, ReqwestTransport};
//! use kanon_core::{Predicate, RequestSpec, ResponseSpec};
//! use std::time::Duration;
//!
//! let executor = ContractExecutor::new(ReqwestTransport::new(Duration::from_secs(5))?);
//! let base = RequestSpec::builder().base_url("https://reqres.in").base_path("/api").build()?;
//!
//! let result = executor
//!     .execute(
//!         &base,
//!         Call::get("/users?page=2"),
//!         &ResponseSpec::builder().status(200).body("data", Predicate::size(6)).build()?,
//!     )
//!     .await?;
//! ```

#![doc(html_root_url = "https://docs.rs/kanon-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod call;
mod error;
mod executor;
pub mod form;
mod http_client;
mod mock;
mod report;
mod step;
mod transport;

pub use call::{Call, RequestBody};
pub use error::{ContractError, ContractResult, TransportError};
pub use executor::{ContractExecutor, DEFAULT_TIMEOUT};
pub use http_client::ReqwestTransport;
pub use mock::{MockHandler, MockRoutes, MockTransport};
pub use report::{NoopReporter, RecordingReporter, Reporter, TracingReporter};
pub use step::StepOutcome;
pub use transport::{BoxFuture, HttpTransport, TransportRequest, TransportResponse};
