//! JobReporter - turn an outcome into exactly one orchestrator call.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::timeout::bounded;
use crate::domain::{JobId, JobOutcome};
use crate::ports::{FailureDetails, PipelineClient, PipelineError};

pub struct JobReporter {
    pipeline: Arc<dyn PipelineClient>,
    timeout: Duration,
}

impl JobReporter {
    pub fn new(pipeline: Arc<dyn PipelineClient>, timeout: Duration) -> Self {
        Self { pipeline, timeout }
    }

    pub async fn report(&self, job_id: &JobId, outcome: &JobOutcome) -> Result<(), PipelineError> {
        info!(kind = ?outcome.kind(), "reporting job result");
        let call = async {
            match outcome {
                JobOutcome::Continue { token, summary } => {
                    self.pipeline
                        .put_job_continuation(job_id, &token.encode(), summary)
                        .await
                }
                JobOutcome::Success { summary } => {
                    self.pipeline.put_job_success(job_id, summary).await
                }
                JobOutcome::Failure {
                    failure_type,
                    message,
                } => {
                    let details = FailureDetails::new(*failure_type, message);
                    self.pipeline.put_job_failure(job_id, &details).await
                }
            }
        };
        bounded(self.timeout, call, PipelineError::Timeout).await
    }
}
