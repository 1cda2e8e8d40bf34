//! # Kanon Core
//!
//! Pure specification and validation types for declarative HTTP contract
//! tests. Nothing in this crate performs I/O.
//!
//! - [`ModelSchema`] / [`Model`] - Tolerant JSON model binding
//! - [`BodyRule`] / [`Predicate`] - Structural and aggregate body assertions
//! - [`evaluate`] - The assertion evaluator
//! - [`RequestSpec`] - Composable request defaults
//! - [`ResponseSpec`] - Composable response expectations
//! - [`ExecutionResult`] - Outcome of one contract call, with its step trace

#![doc(html_root_url = "https://docs.rs/kanon-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod evaluator;
mod execution;
pub mod fixtures;
mod log;
pub mod model;
mod path;
mod predicate;
mod request_spec;
mod response_spec;

pub use error::{
    AssertionFailure, FailureReason, KanonResult, ModelError, ParseError, PathError, SpecError,
    ValidationFailure,
};
pub use evaluator::evaluate;
pub use execution::{ExecutionResult, StepRecord, StepStatus};
pub use log::{LogDetail, LogFlags};
pub use model::{bind, bind_as, serialize, FieldDef, FieldType, Model, ModelSchema, ModelSchemaBuilder};
pub use path::{JsonPath, Segment};
pub use predicate::{BodyRule, ElementPredicate, Predicate};
pub use request_spec::{ContentType, RequestSpec, RequestSpecBuilder};
pub use response_spec::{ResponseSpec, ResponseSpecBuilder};
