//! StackStarter - issue the create or update for a new job.
//!
//! # Decision
//! - stack absent → create, `Continue`
//! - stack updatable → update, `Continue` (or `Success` if nothing changed)
//! - stack busy with an operation tagged with this job, and we are resuming
//!   our own start → `Continue` polling
//! - anything else → `StackNotUpdatable`
//!
//! The first invocation never waits for the operation to finish.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::timeout::bounded;
use crate::domain::{ContinuationToken, JobId, JobOutcome, JobParameters, StackRequest, Template};
use crate::error::HandlerError;
use crate::ports::{ProviderError, StackService};

pub struct StackStarter {
    stacks: Arc<dyn StackService>,
    timeout: Duration,
}

impl StackStarter {
    pub fn new(stacks: Arc<dyn StackService>, timeout: Duration) -> Self {
        Self { stacks, timeout }
    }

    /// Start a create or update of `params.stack` from `template`.
    ///
    /// `resuming` is true when a previous invocation of this job hit a
    /// transient error before its request was confirmed.
    pub async fn start(
        &self,
        job_id: &JobId,
        params: &JobParameters,
        template: &Template,
        resuming: bool,
    ) -> Result<JobOutcome, HandlerError> {
        let stack = &params.stack;
        let request = StackRequest::for_job(job_id, stack, template, &params.capabilities);

        let existing = bounded(
            self.timeout,
            self.stacks.describe_stack(stack),
            ProviderError::Timeout,
        )
        .await?;

        let Some(description) = existing else {
            info!(%stack, "stack does not exist, creating");
            bounded(
                self.timeout,
                self.stacks.create_stack(&request),
                ProviderError::Timeout,
            )
            .await?;
            return Ok(JobOutcome::proceed(
                ContinuationToken::polling(job_id),
                "Stack create started",
            ));
        };

        let status = description.parsed_status()?;
        if status.is_updatable() {
            info!(%stack, %status, "updating stack");
            let updated = bounded(
                self.timeout,
                self.stacks.update_stack(&request),
                ProviderError::Timeout,
            )
            .await;
            return match updated {
                Ok(()) => Ok(JobOutcome::proceed(
                    ContinuationToken::polling(job_id),
                    "Stack update started",
                )),
                Err(ProviderError::NoUpdates) => {
                    info!(%stack, "template unchanged, nothing to update");
                    Ok(JobOutcome::success("There were no stack updates"))
                }
                Err(e) => Err(e.into()),
            };
        }

        if resuming && status.is_in_progress() && description.job_tag() == Some(job_id.as_str()) {
            info!(%stack, %status, "operation from an earlier attempt is running");
            return Ok(JobOutcome::proceed(
                ContinuationToken::polling(job_id),
                "Stack operation already in progress",
            ));
        }

        Err(HandlerError::StackNotUpdatable {
            stack: stack.clone(),
            status,
        })
    }
}
