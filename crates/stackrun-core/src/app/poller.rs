//! StackPoller - one status read, one outcome.
//!
//! No sleeping and no retry loop here: if the operation is still running we
//! return `Continue` and the orchestrator calls us again later.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::timeout::bounded;
use crate::domain::{
    ContinuationToken, JobId, JobOutcome, StackName, StackStatus, StatusFamily,
};
use crate::error::HandlerError;
use crate::ports::{ProviderError, StackService};

pub struct StackPoller {
    stacks: Arc<dyn StackService>,
    timeout: Duration,
}

impl StackPoller {
    pub fn new(stacks: Arc<dyn StackService>, timeout: Duration) -> Self {
        Self { stacks, timeout }
    }

    pub async fn poll(&self, job_id: &JobId, stack: &StackName) -> Result<JobOutcome, HandlerError> {
        let description = bounded(
            self.timeout,
            self.stacks.describe_stack(stack),
            ProviderError::Timeout,
        )
        .await?
        .ok_or_else(|| ProviderError::StackNotFound(stack.clone()))?;

        let status = description.parsed_status()?;
        let reason = description.status_reason.as_deref();
        info!(%stack, %status, reason, "stack status");

        let outcome = match status.family() {
            StatusFamily::InProgress => JobOutcome::proceed(
                ContinuationToken::polling(job_id),
                "Stack update still in progress",
            ),
            StatusFamily::Complete => JobOutcome::success("Stack update complete"),
            StatusFamily::Failed => {
                JobOutcome::failure(failure_message(failed_prefix(status), status, reason))
            }
            StatusFamily::Deleted => {
                JobOutcome::failure(failure_message("Stack is being deleted", status, reason))
            }
        };
        Ok(outcome)
    }
}

/// Which operation a failed status belongs to.
fn failed_prefix(status: StackStatus) -> &'static str {
    match status {
        StackStatus::CreateFailed | StackStatus::RollbackFailed | StackStatus::RollbackComplete => {
            "Stack create failed"
        }
        StackStatus::ImportRollbackFailed | StackStatus::ImportRollbackComplete => {
            "Stack import failed"
        }
        _ => "Update failed",
    }
}

fn failure_message(prefix: &str, status: StackStatus, reason: Option<&str>) -> String {
    match reason.filter(|r| !r.is_empty()) {
        Some(reason) => format!("{prefix}: {status} ({reason})"),
        None => format!("{prefix}: {status}"),
    }
}
