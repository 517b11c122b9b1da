//! stackrun-sim: drives the handler against in-memory services.
//!
//! Plays the orchestrator: builds the job event, invokes the handler, feeds
//! the continuation token back in, and lets the stack operation finish
//! between invocations.

use std::error::Error;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use stackrun_core::domain::{ObjectLocation, StackName};
use stackrun_core::impls::{
    InMemoryObjectStore, InMemoryStackService, RecordingPipelineClient, ReportedResult,
    StaticStoreConnector, zip_archive,
};
use stackrun_core::ports::ProviderError;
use stackrun_core::{HandlerConfig, JobHandler, JobOutcome, init_tracing};

const STACK: &str = "web";
const ARTIFACT: &str = "BuildOutput";
const TEMPLATE: &str = "infra.json";
const MAX_INVOCATIONS: usize = 20;

fn artifact_location(key: &str) -> ObjectLocation {
    ObjectLocation {
        bucket_name: "pipeline-artifacts".to_string(),
        object_key: key.to_string(),
    }
}

fn job_event(job_id: &str, artifact_key: &str, token: Option<&str>) -> Value {
    let params = json!({ "stack": STACK, "artifact": ARTIFACT, "file": TEMPLATE });
    let mut data = json!({
        "actionConfiguration": { "configuration": { "UserParameters": params.to_string() } },
        "inputArtifacts": [{
            "name": ARTIFACT,
            "location": {
                "type": "S3",
                "s3Location": { "bucketName": "pipeline-artifacts", "objectKey": artifact_key }
            }
        }],
        "artifactCredentials": {
            "accessKeyId": "AKIASIM",
            "secretAccessKey": "sim-secret",
            "sessionToken": "sim-session"
        }
    });
    if let Some(token) = token {
        data["continuationToken"] = json!(token);
    }
    json!({ "CodePipeline.job": { "id": job_id, "data": data } })
}

struct Sim {
    handler: JobHandler,
    pipeline: Arc<RecordingPipelineClient>,
    stacks: Arc<InMemoryStackService>,
}

impl Sim {
    /// Invoke the handler for one job until it reports a terminal result.
    async fn run_job(&self, job_id: &str, artifact_key: &str) -> Result<JobOutcome, Box<dyn Error>> {
        let mut token: Option<String> = None;
        for invocation in 1..=MAX_INVOCATIONS {
            let event = job_event(job_id, artifact_key, token.as_deref());
            let outcome = self.handler.handle(&event).await?;
            info!(job_id, invocation, kind = ?outcome.kind(), "invocation finished");

            if outcome.is_terminal() {
                return Ok(outcome);
            }

            token = match self.pipeline.results().await.last() {
                Some(ReportedResult::Continuation { token, .. }) => Some(token.clone()),
                other => return Err(format!("expected a continuation, got {other:?}").into()),
            };

            // The provisioning work happens between invocations.
            self.stacks.finish_operation(&StackName::new(STACK)).await;
        }
        Err(format!("job {job_id} did not finish after {MAX_INVOCATIONS} invocations").into())
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = HandlerConfig::from_env()?;
    init_tracing(&config.log)?;

    // (A) artifacts: a first template, then a changed one
    let store = Arc::new(InMemoryObjectStore::new());
    let v1 = r#"{"Resources":{"Bucket":{"Type":"AWS::S3::Bucket"}}}"#;
    let v2 = r#"{"Resources":{"Bucket":{"Type":"AWS::S3::Bucket"},"Queue":{"Type":"AWS::SQS::Queue"}}}"#;
    store.put(artifact_location("build-1.zip"), zip_archive(&[(TEMPLATE, v1)])?).await;
    store.put(artifact_location("build-2.zip"), zip_archive(&[(TEMPLATE, v2)])?).await;

    // (B) handler wired to in-memory services
    let pipeline = Arc::new(RecordingPipelineClient::new());
    let stacks = Arc::new(InMemoryStackService::new());
    let connector = StaticStoreConnector::new(store).requiring_credentials();
    let sim = Sim {
        handler: JobHandler::new(pipeline.clone(), stacks.clone(), Arc::new(connector), &config),
        pipeline: pipeline.clone(),
        stacks: stacks.clone(),
    };

    // (C) first deploy creates the stack; one throttled call along the way
    stacks
        .fail_next(ProviderError::Throttled {
            code: "Throttling".to_string(),
            message: "Rate exceeded".to_string(),
        })
        .await;
    let outcome = sim.run_job("job-create", "build-1.zip").await?;
    println!("create:    {outcome:?}");

    // (D) same template again: nothing to update
    let outcome = sim.run_job("job-noop", "build-1.zip").await?;
    println!("no-op:     {outcome:?}");

    // (E) changed template: update
    let outcome = sim.run_job("job-update", "build-2.zip").await?;
    println!("update:    {outcome:?}");

    println!("reports:   {}", pipeline.results().await.len());
    println!("mutations: {}", stacks.mutation_count().await);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("stackrun-sim: {e}");
        std::process::exit(1);
    }
}
