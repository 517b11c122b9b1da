//! Domain model (ids, job, template, stack status, outcome, token, errors).

pub mod errors;
pub mod ids;
pub mod job;
pub mod outcome;
pub mod stack;
pub mod status;
pub mod template;
pub mod token;

pub use errors::ErrorKind;
pub use ids::{JobId, StackName};
pub use job::{
    ArtifactCredentials, ArtifactLocation, ArtifactRef, EncryptionKey, EventError, Job,
    JobParameters, ObjectLocation,
};
pub use outcome::{FailureType, JobOutcome, OutcomeKind};
pub use stack::{StackDescription, StackRequest, JOB_TAG_KEY};
pub use status::{StackStatus, StatusFamily, UnmappedStatus};
pub use template::{Template, TemplateDocument, TemplateFormat};
pub use token::{ContinuationToken, Phase};
