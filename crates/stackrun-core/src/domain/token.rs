//! Continuation token: the only state carried between invocations of one job.
//!
//! The orchestrator stores whatever string we hand it in a continuation and
//! gives it back on the next invocation. We encode a small JSON document so
//! the next invocation knows which phase to resume in and how many transient
//! errors in a row it has already absorbed.

use serde::{Deserialize, Serialize};

use super::ids::JobId;

/// Which half of the state machine the next invocation enters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The create/update request has not been confirmed yet.
    Start,

    /// A stack operation is in flight; read its status.
    #[default]
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken {
    pub previous_job_id: JobId,

    #[serde(default)]
    pub phase: Phase,

    /// Consecutive transient errors seen so far for this job.
    #[serde(default)]
    pub transient_retries: u32,
}

impl ContinuationToken {
    /// Token for a job whose stack operation is running.
    pub fn polling(job_id: &JobId) -> Self {
        Self {
            previous_job_id: job_id.clone(),
            phase: Phase::Poll,
            transient_retries: 0,
        }
    }

    /// Token for a job whose create/update request has to be issued again.
    pub fn starting(job_id: &JobId) -> Self {
        Self {
            previous_job_id: job_id.clone(),
            phase: Phase::Start,
            transient_retries: 0,
        }
    }

    /// Same phase, one more transient error.
    pub fn after_transient_error(&self) -> Self {
        Self {
            previous_job_id: self.previous_job_id.clone(),
            phase: self.phase,
            transient_retries: self.transient_retries.saturating_add(1),
        }
    }

    pub fn encode(&self) -> String {
        // Serializing a struct of strings and integers cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| self.previous_job_id.to_string())
    }

    /// Decode a token received from the orchestrator.
    ///
    /// Tokens we did not produce are treated as "poll, no retries yet" for the
    /// current job.
    pub fn decode(raw: &str, job_id: &JobId) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self::polling(job_id))
    }
}
