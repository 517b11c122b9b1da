//! Stack request/response shapes exchanged with the provisioning service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{JobId, StackName};
use super::status::{StackStatus, UnmappedStatus};
use super::template::Template;

/// Tag attached to every stack we create or update.
pub const JOB_TAG_KEY: &str = "pipeline-job-id";

/// What `describe_stack` returns.
///
/// `status` stays a raw string here; `parsed_status` maps it into the closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDescription {
    pub name: StackName,
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl StackDescription {
    pub fn parsed_status(&self) -> Result<StackStatus, UnmappedStatus> {
        self.status.parse()
    }

    /// Job that issued the stack's latest create/update, if it was one of ours.
    pub fn job_tag(&self) -> Option<&str> {
        self.tags.get(JOB_TAG_KEY).map(String::as_str)
    }
}

/// A create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRequest {
    pub stack: StackName,
    pub template_body: String,

    /// Idempotency token: the same job always sends the same value.
    pub client_request_token: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StackRequest {
    /// Build a request for `stack` from `template`, correlated with `job_id`.
    pub fn for_job(
        job_id: &JobId,
        stack: &StackName,
        template: &Template,
        capabilities: &[String],
    ) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(JOB_TAG_KEY.to_string(), job_id.to_string());
        Self {
            stack: stack.clone(),
            template_body: template.body.clone(),
            client_request_token: job_id.client_request_token(),
            capabilities: capabilities.to_vec(),
            tags,
        }
    }

    pub fn job_tag(&self) -> Option<&str> {
        self.tags.get(JOB_TAG_KEY).map(String::as_str)
    }
}
