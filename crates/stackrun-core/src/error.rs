use thiserror::Error;

use crate::domain::{ErrorKind, EventError, FailureType, StackName, StackStatus, UnmappedStatus};
use crate::ports::{PipelineError, ProviderError, StorageError};

/// Everything that can go wrong while handling one job.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("input artifact named \"{0}\" not found in event")]
    ArtifactNotFound(String),

    #[error("input artifact \"{artifact}\" has location type {kind}, expected S3")]
    UnsupportedArtifactLocation { artifact: String, kind: String },

    #[error("artifact archive could not be read: {0}")]
    Archive(String),

    #[error("template file \"{0}\" not found in artifact")]
    TemplateNotFound(String),

    #[error("template file \"{path}\" is not valid structured data: {reason}")]
    TemplateParse { path: String, reason: String },

    #[error("Stack {stack} cannot be updated when status is: {status}")]
    StackNotUpdatable { stack: StackName, status: StackStatus },

    #[error(transparent)]
    UnmappedStatus(#[from] UnmappedStatus),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The result could not be delivered to the orchestrator.
    #[error("reporting job result failed: {0}")]
    Report(#[from] PipelineError),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Provider(e) => e.kind(),
            HandlerError::Storage(e) => e.kind(),
            _ => ErrorKind::Terminal,
        }
    }

    /// How the orchestrator should categorise a failure caused by this error.
    pub fn failure_type(&self) -> FailureType {
        match self {
            HandlerError::Event(_)
            | HandlerError::ArtifactNotFound(_)
            | HandlerError::UnsupportedArtifactLocation { .. } => FailureType::ConfigurationError,
            _ => FailureType::JobFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_provider_and_storage_errors_are_transient() {
        let e: HandlerError = ProviderError::Transport("reset".into()).into();
        assert_eq!(e.kind(), ErrorKind::Transient);

        let e: HandlerError = StorageError::Transport("reset".into()).into();
        assert_eq!(e.kind(), ErrorKind::Transient);

        let e: HandlerError = ProviderError::NoUpdates.into();
        assert_eq!(e.kind(), ErrorKind::Terminal);

        let e = HandlerError::TemplateNotFound("infra.json".into());
        assert_eq!(e.kind(), ErrorKind::Terminal);
    }

    #[test]
    fn parameter_problems_are_configuration_failures() {
        let e: HandlerError = EventError::MissingParameter("stack name").into();
        assert_eq!(e.failure_type(), FailureType::ConfigurationError);
        assert_eq!(
            HandlerError::ArtifactNotFound("BuildOutput".into()).failure_type(),
            FailureType::ConfigurationError
        );
        assert_eq!(
            HandlerError::TemplateNotFound("x".into()).failure_type(),
            FailureType::JobFailed
        );
    }

    #[test]
    fn not_updatable_message_names_status() {
        let e = HandlerError::StackNotUpdatable {
            stack: StackName::new("web"),
            status: StackStatus::UpdateInProgress,
        };
        assert_eq!(
            e.to_string(),
            "Stack web cannot be updated when status is: UPDATE_IN_PROGRESS"
        );
    }
}
