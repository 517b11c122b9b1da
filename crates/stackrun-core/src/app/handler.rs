//! JobHandler - one invocation, one reported result.
//!
//! # Flow
//! 1. read the job id (missing → logged, returned unreported)
//! 2. decode the job (bad parameters → `ConfigurationError` failure)
//! 3. reconcile:
//!    - no token → locate artifact, fetch template, start
//!    - token in phase `start` → same, resuming
//!    - token in phase `poll` → poll
//! 4. errors go through the `Decider`: retry → `Continue`, give up → `Failure`
//! 5. report exactly once

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, error, info, info_span, warn};

use super::decision::{Decider, Decision, DefaultDecider};
use super::fetcher::TemplateFetcher;
use super::locator::find_artifact;
use super::poller::StackPoller;
use super::reporter::JobReporter;
use super::starter::StackStarter;
use crate::config::HandlerConfig;
use crate::domain::{ContinuationToken, Job, JobId, JobOutcome, Phase};
use crate::error::HandlerError;
use crate::ports::{PipelineClient, StackService, StoreConnector};

pub struct JobHandler {
    stores: Arc<dyn StoreConnector>,
    fetcher: TemplateFetcher,
    starter: StackStarter,
    poller: StackPoller,
    reporter: JobReporter,
    decider: Arc<dyn Decider>,
}

impl JobHandler {
    pub fn new(
        pipeline: Arc<dyn PipelineClient>,
        stacks: Arc<dyn StackService>,
        stores: Arc<dyn StoreConnector>,
        config: &HandlerConfig,
    ) -> Self {
        let timeout = config.call_timeout;
        Self {
            stores,
            fetcher: TemplateFetcher::new(timeout),
            starter: StackStarter::new(stacks.clone(), timeout),
            poller: StackPoller::new(stacks, timeout),
            reporter: JobReporter::new(pipeline, timeout),
            decider: Arc::new(DefaultDecider::new(config.max_transient_retries)),
        }
    }

    pub fn with_decider(mut self, decider: Arc<dyn Decider>) -> Self {
        self.decider = decider;
        self
    }

    /// Handle one pipeline event.
    ///
    /// Returns the outcome that was reported. `Err` means nothing could be
    /// reported: the event had no job id, or the report call itself failed.
    pub async fn handle(&self, event: &Value) -> Result<JobOutcome, HandlerError> {
        let job_id = match Job::id_from_event(event) {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "event has no job id, nothing to report");
                return Err(e.into());
            }
        };

        let span = info_span!("job", job_id = %job_id);
        self.handle_job(&job_id, event).instrument(span).await
    }

    async fn handle_job(&self, job_id: &JobId, event: &Value) -> Result<JobOutcome, HandlerError> {
        let outcome = match Job::from_event(event) {
            Ok(job) => {
                info!(
                    stack = %job.parameters.stack,
                    continuation = job.is_continuation(),
                    "handling job"
                );
                self.reconcile(&job).await
            }
            Err(e) => {
                let e = HandlerError::from(e);
                warn!(error = %e, "job data rejected");
                JobOutcome::Failure {
                    failure_type: e.failure_type(),
                    message: e.to_string(),
                }
            }
        };

        if let Err(e) = self.reporter.report(job_id, &outcome).await {
            error!(error = %e, kind = ?outcome.kind(), "reporting job result failed");
            return Err(e.into());
        }
        Ok(outcome)
    }

    /// Compute the outcome for a decoded job. Never fails: errors become outcomes.
    async fn reconcile(&self, job: &Job) -> JobOutcome {
        let token = job
            .continuation_token
            .as_deref()
            .map(|raw| ContinuationToken::decode(raw, &job.id));

        let result = match token.as_ref().map(|t| t.phase) {
            Some(Phase::Poll) => self.poller.poll(&job.id, &job.parameters.stack).await,
            Some(Phase::Start) => self.start(job, true).await,
            None => self.start(job, false).await,
        };

        let error = match result {
            Ok(outcome) => return outcome,
            Err(e) => e,
        };

        let retries = token.as_ref().map_or(0, |t| t.transient_retries);
        match self.decider.decide(retries, &error) {
            Decision::Retry { reason } => {
                warn!(error = %error, retries, "transient error, asking to be called again");
                let next = match &token {
                    Some(t) => t.after_transient_error(),
                    None => ContinuationToken::starting(&job.id).after_transient_error(),
                };
                JobOutcome::proceed(next, reason)
            }
            Decision::GiveUp { reason } => {
                warn!(error = %error, retries, "failing job");
                JobOutcome::Failure {
                    failure_type: error.failure_type(),
                    message: reason,
                }
            }
        }
    }

    async fn start(&self, job: &Job, resuming: bool) -> Result<JobOutcome, HandlerError> {
        let params = &job.parameters;
        let artifact = find_artifact(&job.input_artifacts, &params.artifact)?;
        let store = self.stores.connect(job.credentials.as_ref())?;
        let template = self
            .fetcher
            .fetch(
                store.as_ref(),
                artifact,
                job.encryption_key.as_ref(),
                &params.template_path,
            )
            .await?;
        self.starter.start(&job.id, params, &template, resuming).await
    }
}
