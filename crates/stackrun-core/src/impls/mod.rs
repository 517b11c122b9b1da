//! Impls - in-memory implementations of the ports.
//!
//! Used by the tests and by `stackrun-sim`. Adapters for the real services
//! live outside this crate and only need to implement the port traits.
//!
//! - **InMemoryStackService**: stacks in a map, call log, injectable errors
//! - **InMemoryObjectStore** / **StaticStoreConnector**: artifact bytes by location
//! - **RecordingPipelineClient**: keeps every reported result

pub mod inmem_objects;
pub mod inmem_stacks;
pub mod recording_pipeline;

pub use self::inmem_objects::{InMemoryObjectStore, StaticStoreConnector, zip_archive};
pub use self::inmem_stacks::{InMemoryStackService, StackCall};
pub use self::recording_pipeline::{RecordingPipelineClient, ReportedResult};
