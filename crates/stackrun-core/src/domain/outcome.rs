//! Outcome model: the single result of one invocation.
//!
//! Exactly one `JobOutcome` is produced per invocation and it is the only
//! thing the orchestrator ever observes. This module only defines its shape;
//! `app::reporter` turns it into an orchestrator call.

use serde::{Deserialize, Serialize};

use super::token::ContinuationToken;

/// Classification of an outcome.
///
/// Serialized as SCREAMING_SNAKE_CASE: CONTINUE / SUCCESS / FAILURE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Continue,
    Success,
    Failure,
}

/// Failure category understood by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureType {
    JobFailed,
    ConfigurationError,
}

/// Result of one invocation.
///
/// - `Continue`: an operation is in flight (or a transient error is being
///   absorbed); the orchestrator re-invokes us with `token`.
/// - `Success`: terminal.
/// - `Failure`: terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOutcome {
    Continue {
        token: ContinuationToken,
        summary: String,
    },
    Success {
        summary: String,
    },
    Failure {
        failure_type: FailureType,
        message: String,
    },
}

impl JobOutcome {
    pub fn proceed(token: ContinuationToken, summary: impl Into<String>) -> Self {
        JobOutcome::Continue {
            token,
            summary: summary.into(),
        }
    }

    pub fn success(summary: impl Into<String>) -> Self {
        JobOutcome::Success {
            summary: summary.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        JobOutcome::Failure {
            failure_type: FailureType::JobFailed,
            message: message.into(),
        }
    }

    pub fn configuration_failure(message: impl Into<String>) -> Self {
        JobOutcome::Failure {
            failure_type: FailureType::ConfigurationError,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            JobOutcome::Continue { .. } => OutcomeKind::Continue,
            JobOutcome::Success { .. } => OutcomeKind::Success,
            JobOutcome::Failure { .. } => OutcomeKind::Failure,
        }
    }

    /// `Success` and `Failure` end the job; `Continue` does not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobOutcome::Continue { .. })
    }

    pub fn token(&self) -> Option<&ContinuationToken> {
        match self {
            JobOutcome::Continue { token, .. } => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobId;

    #[test]
    fn outcome_kind_serializes_screaming_snake() {
        let s = serde_json::to_string(&OutcomeKind::Continue).unwrap();
        assert_eq!(s, "\"CONTINUE\"");

        let s = serde_json::to_string(&OutcomeKind::Success).unwrap();
        assert_eq!(s, "\"SUCCESS\"");

        let s = serde_json::to_string(&OutcomeKind::Failure).unwrap();
        assert_eq!(s, "\"FAILURE\"");
    }

    #[test]
    fn only_continue_is_non_terminal() {
        let token = ContinuationToken::polling(&JobId::new("j"));
        let o = JobOutcome::proceed(token.clone(), "Stack create started");
        assert!(!o.is_terminal());
        assert_eq!(o.kind(), OutcomeKind::Continue);
        assert_eq!(o.token(), Some(&token));

        assert!(JobOutcome::success("done").is_terminal());
        assert!(JobOutcome::failure("boom").is_terminal());
        assert_eq!(JobOutcome::success("done").token(), None);
    }

    #[test]
    fn configuration_failures_are_typed() {
        let o = JobOutcome::configuration_failure("missing stack name");
        assert!(matches!(
            o,
            JobOutcome::Failure { failure_type: FailureType::ConfigurationError, .. }
        ));
    }

    #[test]
    fn outcome_is_internally_tagged() {
        let v = serde_json::to_value(JobOutcome::failure("oops")).unwrap();
        assert_eq!(v["kind"], "failure");
        assert_eq!(v["failure_type"], "JobFailed");
        assert_eq!(v["message"], "oops");
    }
}
