//! stackrun-core
//!
//! Pipeline action handler that deploys a stack from a template shipped in a
//! build artifact. Each invocation either starts a create/update or polls the
//! operation a previous invocation started, then reports `Continue`,
//! `Success` or `Failure` back to the orchestrator.
//!
//! # Modules
//! - **domain**: event, parameters, template, stack status, outcome, token
//! - **ports**: PipelineClient, StackService, StoreConnector/ObjectStore
//! - **app**: JobHandler and its steps (fetch, start, poll, decide, report)
//! - **impls**: in-memory ports for tests and the simulator
//! - **config** / **observability**: environment settings and log setup

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{Decider, Decision, DefaultDecider, JobHandler};
pub use config::{ConfigError, HandlerConfig, LogConfig, LogFormat};
pub use domain::{ContinuationToken, FailureType, JobId, JobOutcome, OutcomeKind, Phase, StackName};
pub use error::HandlerError;
pub use observability::init_tracing;
