//! StackService port - the provisioning service.
//!
//! Real adapters translate their SDK's error into `ProviderError` with
//! [`ProviderError::classify`], so every adapter agrees on what is retryable.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ErrorKind, StackDescription, StackName, StackRequest};

/// Error codes the provisioning service uses for throttling and outages.
const TRANSIENT_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "ServiceUnavailable",
    "InternalFailure",
    "RequestTimeout",
];

const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("stack {0} does not exist")]
    StackNotFound(StackName),

    /// The update would not change anything.
    #[error("No updates are to be performed.")]
    NoUpdates,

    #[error("request throttled ({code}): {message}")]
    Throttled { code: String, message: String },

    #[error("provisioning service call timed out after {0:?}")]
    Timeout(Duration),

    #[error("provisioning service unreachable: {0}")]
    Transport(String),

    /// Anything else the service rejected (validation, permissions, limits).
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },
}

impl ProviderError {
    /// Classify a service error by code, then message.
    pub fn classify(stack: &StackName, code: &str, message: &str) -> Self {
        if TRANSIENT_CODES.contains(&code) {
            ProviderError::Throttled {
                code: code.to_string(),
                message: message.to_string(),
            }
        } else if code == "ValidationError" && message.contains("does not exist") {
            ProviderError::StackNotFound(stack.clone())
        } else if message.contains(NO_UPDATES_MESSAGE) {
            ProviderError::NoUpdates
        } else {
            ProviderError::Rejected {
                code: code.to_string(),
                message: message.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Throttled { .. }
            | ProviderError::Timeout(_)
            | ProviderError::Transport(_) => ErrorKind::Transient,
            ProviderError::StackNotFound(_)
            | ProviderError::NoUpdates
            | ProviderError::Rejected { .. } => ErrorKind::Terminal,
        }
    }
}

/// The three provisioning-service calls the handler needs.
#[async_trait]
pub trait StackService: Send + Sync {
    /// Current description of `stack`, or `None` if it does not exist.
    async fn describe_stack(&self, stack: &StackName)
    -> Result<Option<StackDescription>, ProviderError>;

    async fn create_stack(&self, request: &StackRequest) -> Result<(), ProviderError>;

    /// Fails with `ProviderError::NoUpdates` when the template is unchanged.
    async fn update_stack(&self, request: &StackRequest) -> Result<(), ProviderError>;
}
