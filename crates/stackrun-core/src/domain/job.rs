//! Job model: what the orchestrator hands us on every invocation.
//!
//! The inbound event is decoded in two steps. The job id is pulled out first,
//! on its own, because without it nothing can be reported; everything else is
//! decoded afterwards and any problem there becomes a reported job failure.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::ids::{JobId, StackName};

/// Top-level key of the job object inside the invocation event.
pub const JOB_KEY: &str = "CodePipeline.job";

/// Errors raised while decoding the inbound event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event does not carry a job id")]
    MissingJobId,

    #[error("job data could not be decoded: {0}")]
    InvalidJobData(String),

    #[error("action configuration has no UserParameters")]
    MissingUserParameters,

    #[error("UserParameters could not be decoded as JSON: {0}")]
    UserParametersNotJson(String),

    #[error("Your UserParameters JSON must include the {0}")]
    MissingParameter(&'static str),
}

/// One unit of pipeline work, as received for this invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub parameters: JobParameters,
    pub input_artifacts: Vec<ArtifactRef>,

    /// Present only when the orchestrator re-invokes a job we asked to continue.
    pub continuation_token: Option<String>,

    pub credentials: Option<ArtifactCredentials>,
    pub encryption_key: Option<EncryptionKey>,
}

/// Action parameters decoded from the `UserParameters` JSON string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
    pub stack: StackName,
    pub artifact: String,
    pub template_path: String,

    /// Capability acknowledgements forwarded to create/update (e.g. `CAPABILITY_IAM`).
    pub capabilities: Vec<String>,
}

/// A named input artifact and where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub location: ArtifactLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactLocation {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(rename = "s3Location")]
    pub s3: ObjectLocation,
}

/// Bucket/key pair in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLocation {
    pub bucket_name: String,
    pub object_key: String,
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket_name, self.object_key)
    }
}

/// Temporary credentials the orchestrator issues for reading input artifacts.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

// Secrets must never reach the logs.
impl fmt::Debug for ArtifactCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

/// Decryption context for the artifact object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncryptionKey {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJobData {
    action_configuration: RawActionConfiguration,

    #[serde(default)]
    input_artifacts: Vec<ArtifactRef>,

    #[serde(default)]
    continuation_token: Option<String>,

    #[serde(default)]
    artifact_credentials: Option<ArtifactCredentials>,

    #[serde(default)]
    encryption_key: Option<EncryptionKey>,
}

#[derive(Deserialize)]
struct RawActionConfiguration {
    configuration: RawConfiguration,
}

#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(rename = "UserParameters", default)]
    user_parameters: Option<String>,
}

#[derive(Deserialize)]
struct RawUserParameters {
    stack: Option<String>,
    artifact: Option<String>,
    file: Option<String>,

    #[serde(default)]
    capabilities: Vec<String>,
}

impl Job {
    /// Extract only the job id.
    pub fn id_from_event(event: &Value) -> Result<JobId, EventError> {
        event
            .get(JOB_KEY)
            .and_then(|job| job.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(JobId::new)
            .ok_or(EventError::MissingJobId)
    }

    /// Decode the whole job.
    pub fn from_event(event: &Value) -> Result<Self, EventError> {
        let id = Self::id_from_event(event)?;
        let data = event
            .get(JOB_KEY)
            .and_then(|job| job.get("data"))
            .ok_or_else(|| EventError::InvalidJobData("missing `data`".to_string()))?;

        let raw = RawJobData::deserialize(data)
            .map_err(|e| EventError::InvalidJobData(e.to_string()))?;

        let parameters =
            JobParameters::parse(raw.action_configuration.configuration.user_parameters.as_deref())?;

        Ok(Self {
            id,
            parameters,
            input_artifacts: raw.input_artifacts,
            continuation_token: raw.continuation_token.filter(|t| !t.is_empty()),
            credentials: raw.artifact_credentials,
            encryption_key: raw.encryption_key,
        })
    }

    pub fn is_continuation(&self) -> bool {
        self.continuation_token.is_some()
    }
}

impl JobParameters {
    /// Decode the `UserParameters` string.
    pub fn parse(user_parameters: Option<&str>) -> Result<Self, EventError> {
        let text = user_parameters
            .ok_or(EventError::MissingUserParameters)?;
        let raw: RawUserParameters = serde_json::from_str(text)
            .map_err(|e| EventError::UserParametersNotJson(e.to_string()))?;

        Ok(Self {
            stack: StackName::new(required(raw.stack, "stack name")?),
            artifact: required(raw.artifact, "artifact name")?,
            template_path: required(raw.file, "template file name")?,
            capabilities: raw.capabilities,
        })
    }
}

fn required(value: Option<String>, what: &'static str) -> Result<String, EventError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(EventError::MissingParameter(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(data: Value) -> Value {
        json!({ "CodePipeline.job": { "id": "job-1", "data": data } })
    }

    fn data_with_params(params: &str) -> Value {
        json!({
            "actionConfiguration": { "configuration": { "UserParameters": params } },
            "inputArtifacts": [
                {
                    "name": "BuildOutput",
                    "location": {
                        "type": "S3",
                        "s3Location": { "bucketName": "artifacts", "objectKey": "web/build.zip" }
                    }
                }
            ],
            "artifactCredentials": {
                "accessKeyId": "AKIDEXAMPLE",
                "secretAccessKey": "very-secret",
                "sessionToken": "session"
            }
        })
    }

    #[test]
    fn decodes_new_job() {
        let ev = event(data_with_params(
            r#"{"stack":"web","artifact":"BuildOutput","file":"infra.json"}"#,
        ));
        let job = Job::from_event(&ev).unwrap();

        assert_eq!(job.id, JobId::new("job-1"));
        assert_eq!(job.parameters.stack, StackName::new("web"));
        assert_eq!(job.parameters.artifact, "BuildOutput");
        assert_eq!(job.parameters.template_path, "infra.json");
        assert!(job.parameters.capabilities.is_empty());
        assert_eq!(job.input_artifacts.len(), 1);
        assert_eq!(job.input_artifacts[0].location.s3.bucket_name, "artifacts");
        assert_eq!(job.input_artifacts[0].location.kind.as_deref(), Some("S3"));
        assert!(!job.is_continuation());
        assert!(job.credentials.is_some());
        assert!(job.encryption_key.is_none());
    }

    #[test]
    fn decodes_continuation_token_and_encryption_key() {
        let mut data = data_with_params(r#"{"stack":"web","artifact":"BuildOutput","file":"a.yaml","capabilities":["CAPABILITY_IAM"]}"#);
        data["continuationToken"] = json!("tok");
        data["encryptionKey"] = json!({ "id": "arn:kms:key", "type": "KMS" });

        let job = Job::from_event(&event(data)).unwrap();
        assert_eq!(job.continuation_token.as_deref(), Some("tok"));
        assert_eq!(job.encryption_key.unwrap().kind, "KMS");
        assert_eq!(job.parameters.capabilities, vec!["CAPABILITY_IAM".to_string()]);
    }

    #[test]
    fn missing_job_id_is_reported_separately() {
        let ev = json!({ "CodePipeline.job": { "data": {} } });
        assert_eq!(Job::id_from_event(&ev), Err(EventError::MissingJobId));
        assert_eq!(Job::from_event(&ev), Err(EventError::MissingJobId));
        assert_eq!(Job::id_from_event(&json!({})), Err(EventError::MissingJobId));
    }

    #[test]
    fn id_is_available_even_when_data_is_broken() {
        let ev = json!({ "CodePipeline.job": { "id": "job-9", "data": 42 } });
        assert_eq!(Job::id_from_event(&ev).unwrap(), JobId::new("job-9"));
        assert!(matches!(Job::from_event(&ev), Err(EventError::InvalidJobData(_))));
    }

    #[test]
    fn user_parameters_must_be_json() {
        let ev = event(data_with_params("stack=web"));
        assert!(matches!(Job::from_event(&ev), Err(EventError::UserParametersNotJson(_))));
    }

    #[test]
    fn absent_user_parameters_are_reported_as_missing() {
        let err = JobParameters::parse(None).unwrap_err();
        assert_eq!(err, EventError::MissingUserParameters);
        assert_eq!(err.to_string(), "action configuration has no UserParameters");

        let ev = event(json!({ "actionConfiguration": { "configuration": {} } }));
        assert_eq!(Job::from_event(&ev), Err(EventError::MissingUserParameters));
    }

    #[test]
    fn each_parameter_is_required() {
        let err = JobParameters::parse(Some(r#"{"artifact":"a","file":"f"}"#)).unwrap_err();
        assert_eq!(err, EventError::MissingParameter("stack name"));

        let err = JobParameters::parse(Some(r#"{"stack":"s","file":"f"}"#)).unwrap_err();
        assert_eq!(err, EventError::MissingParameter("artifact name"));

        let err = JobParameters::parse(Some(r#"{"stack":"s","artifact":"a","file":"  "}"#)).unwrap_err();
        assert_eq!(err, EventError::MissingParameter("template file name"));
        assert_eq!(
            err.to_string(),
            "Your UserParameters JSON must include the template file name"
        );
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let ev = event(data_with_params(
            r#"{"stack":"web","artifact":"BuildOutput","file":"infra.json"}"#,
        ));
        let job = Job::from_event(&ev).unwrap();
        let dbg = format!("{:?}", job);
        assert!(dbg.contains("AKIDEXAMPLE"));
        assert!(!dbg.contains("very-secret"));
        assert!(!dbg.contains("\"session\""));
    }
}
