//! Domain identifiers (strongly-typed IDs).
//!
//! Identifiers here are assigned by external systems (the pipeline
//! orchestrator, the provisioning service). We never generate them, we only
//! carry them around, so they are thin newtypes over `String` that keep a job
//! id from being passed where a stack name is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a pipeline job (the orchestrator's correlation token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Idempotency token for create/update requests issued on behalf of this job.
    ///
    /// The provisioning service accepts `[A-Za-z0-9-]` up to 128 characters, so
    /// every other character is dropped and the result is truncated. A retried
    /// request for the same job therefore carries the same token.
    pub fn client_request_token(&self) -> String {
        let token: String = self
            .0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .take(MAX_CLIENT_REQUEST_TOKEN_LEN)
            .collect();
        if token.is_empty() {
            "stackrun".to_string()
        } else {
            token
        }
    }
}

const MAX_CLIENT_REQUEST_TOKEN_LEN: usize = 128;

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Name of a stack in the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackName(String);

impl StackName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StackName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_serialize_as_plain_strings() {
        let id = JobId::new("11111111-2222-3333-4444-555555555555");
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"11111111-2222-3333-4444-555555555555\"");

        let back: JobId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn client_request_token_keeps_uuid_intact() {
        let id = JobId::new("a1b2c3d4-0000-1111-2222-333344445555");
        assert_eq!(id.client_request_token(), "a1b2c3d4-0000-1111-2222-333344445555");
    }

    #[test]
    fn client_request_token_drops_disallowed_characters_and_truncates() {
        let id = JobId::new(format!("job_{}/x", "z".repeat(200)));
        let token = id.client_request_token();
        assert!(token.starts_with("jobzzz"));
        assert_eq!(token.len(), 128);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn client_request_token_never_empty() {
        assert_eq!(JobId::new("___").client_request_token(), "stackrun");
    }
}
