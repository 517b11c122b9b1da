//! Pipeline client that records what it was told.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::JobId;
use crate::ports::{FailureDetails, PipelineClient, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportedResult {
    Continuation {
        job_id: JobId,
        token: String,
        summary: String,
    },
    Success {
        job_id: JobId,
        summary: String,
    },
    Failure {
        job_id: JobId,
        failure: FailureDetails,
    },
}

impl ReportedResult {
    pub fn job_id(&self) -> &JobId {
        match self {
            ReportedResult::Continuation { job_id, .. }
            | ReportedResult::Success { job_id, .. }
            | ReportedResult::Failure { job_id, .. } => job_id,
        }
    }
}

#[derive(Default)]
struct State {
    results: Vec<ReportedResult>,
    failures: VecDeque<PipelineError>,
}

/// A failed call records nothing.
#[derive(Clone, Default)]
pub struct RecordingPipelineClient {
    state: Arc<Mutex<State>>,
}

impl RecordingPipelineClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn results(&self) -> Vec<ReportedResult> {
        self.state.lock().await.results.clone()
    }

    pub async fn fail_next(&self, error: PipelineError) {
        self.state.lock().await.failures.push_back(error);
    }

    async fn record(&self, result: ReportedResult) -> Result<(), PipelineError> {
        let mut state = self.state.lock().await;
        if let Some(e) = state.failures.pop_front() {
            return Err(e);
        }
        state.results.push(result);
        Ok(())
    }
}

#[async_trait]
impl PipelineClient for RecordingPipelineClient {
    async fn put_job_success(&self, job_id: &JobId, summary: &str) -> Result<(), PipelineError> {
        self.record(ReportedResult::Success {
            job_id: job_id.clone(),
            summary: summary.to_string(),
        })
        .await
    }

    async fn put_job_continuation(
        &self,
        job_id: &JobId,
        continuation_token: &str,
        summary: &str,
    ) -> Result<(), PipelineError> {
        self.record(ReportedResult::Continuation {
            job_id: job_id.clone(),
            token: continuation_token.to_string(),
            summary: summary.to_string(),
        })
        .await
    }

    async fn put_job_failure(
        &self,
        job_id: &JobId,
        failure: &FailureDetails,
    ) -> Result<(), PipelineError> {
        self.record(ReportedResult::Failure {
            job_id: job_id.clone(),
            failure: failure.clone(),
        })
        .await
    }
}
