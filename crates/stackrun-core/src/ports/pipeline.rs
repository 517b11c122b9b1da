//! PipelineClient port - the orchestrator's job-result API.
//!
//! One invocation makes exactly one of these calls.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{FailureType, JobId};

/// Longest failure message the orchestrator accepts.
pub const MAX_FAILURE_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetails {
    pub failure_type: FailureType,
    pub message: String,
}

impl FailureDetails {
    /// Build failure details, truncating the message to the orchestrator limit.
    pub fn new(failure_type: FailureType, message: &str) -> Self {
        let message = match message.char_indices().nth(MAX_FAILURE_MESSAGE_LEN) {
            Some((cut, _)) => message[..cut].to_string(),
            None => message.to_string(),
        };
        Self {
            failure_type,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("job {0} is not in a state that accepts results")]
    InvalidJobState(JobId),

    #[error("orchestrator call timed out after {0:?}")]
    Timeout(Duration),

    #[error("orchestrator call failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait PipelineClient: Send + Sync {
    async fn put_job_success(&self, job_id: &JobId, summary: &str) -> Result<(), PipelineError>;

    async fn put_job_continuation(
        &self,
        job_id: &JobId,
        continuation_token: &str,
        summary: &str,
    ) -> Result<(), PipelineError>;

    async fn put_job_failure(
        &self,
        job_id: &JobId,
        failure: &FailureDetails,
    ) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_are_kept() {
        let d = FailureDetails::new(FailureType::JobFailed, "boom");
        assert_eq!(d.message, "boom");
    }

    #[test]
    fn long_messages_are_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_FAILURE_MESSAGE_LEN + 10);
        let d = FailureDetails::new(FailureType::JobFailed, &long);
        assert_eq!(d.message.chars().count(), MAX_FAILURE_MESSAGE_LEN);
    }
}
