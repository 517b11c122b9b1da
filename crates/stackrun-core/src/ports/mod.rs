//! Ports - interfaces to the external systems.
//!
//! Each trait stands for one collaborator the handler talks to over the
//! network. The handler receives them as `Arc<dyn ...>` and never builds a
//! client itself, so credentials and region setup stay outside the core.
//!
//! - **PipelineClient**: the orchestrator (job results)
//! - **StackService**: the provisioning service (describe/create/update)
//! - **StoreConnector / ObjectStore**: the artifact object store

pub mod object_store;
pub mod pipeline;
pub mod stack_service;

pub use self::object_store::{ObjectStore, StorageError, StoreConnector};
pub use self::pipeline::{FailureDetails, MAX_FAILURE_MESSAGE_LEN, PipelineClient, PipelineError};
pub use self::stack_service::{ProviderError, StackService};
