//! Decision model: what to do with an error raised while handling a job.
//!
//! Deciders are pure: given the retry count carried in the continuation
//! token and the error, they return the next action. Turning the decision
//! into a `JobOutcome` is the handler's job.

use crate::error::HandlerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Leave the job pending; the orchestrator invokes us again.
    Retry { reason: String },

    /// Fail the job.
    GiveUp { reason: String },
}

pub trait Decider: Send + Sync {
    /// # Arguments
    /// * `retries` - transient errors already absorbed for this job
    /// * `error` - the error raised by this invocation
    fn decide(&self, retries: u32, error: &HandlerError) -> Decision;
}

/// Retries transient errors up to `max_transient_retries` times in a row.
///
/// Terminal errors are never retried.
#[derive(Debug, Clone)]
pub struct DefaultDecider {
    max_transient_retries: u32,
}

impl DefaultDecider {
    pub fn new(max_transient_retries: u32) -> Self {
        Self {
            max_transient_retries,
        }
    }
}

impl Decider for DefaultDecider {
    fn decide(&self, retries: u32, error: &HandlerError) -> Decision {
        if !error.kind().is_transient() {
            return Decision::GiveUp {
                reason: error.to_string(),
            };
        }

        if retries >= self.max_transient_retries {
            Decision::GiveUp {
                reason: format!("Giving up after {retries} transient errors: {error}"),
            }
        } else {
            Decision::Retry {
                reason: format!(
                    "Transient error, retry {}/{}: {error}",
                    retries + 1,
                    self.max_transient_retries
                ),
            }
        }
    }
}
