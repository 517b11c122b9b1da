//! In-memory provisioning service.
//!
//! Behaves like the real service where the handler can tell the difference:
//! create starts `CREATE_IN_PROGRESS`, update starts `UPDATE_IN_PROGRESS`,
//! an update with an unchanged body is rejected with "no updates", and a
//! repeated create with the same client request token is accepted once.
//! Operations never finish on their own; call `finish_operation` to move a
//! stack to the matching `*_COMPLETE` status.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{StackDescription, StackName, StackRequest, StackStatus};
use crate::ports::{ProviderError, StackService};

/// One call made against the service, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackCall {
    Describe(StackName),
    Create(StackRequest),
    Update(StackRequest),
}

#[derive(Debug, Clone)]
struct StoredStack {
    /// Raw status string, so tests can plant values the enum does not know.
    status: String,
    status_reason: Option<String>,
    template_body: String,
    capabilities: Vec<String>,
    tags: BTreeMap<String, String>,
    last_request_token: Option<String>,
}

#[derive(Default)]
struct State {
    stacks: HashMap<StackName, StoredStack>,
    calls: Vec<StackCall>,

    /// Errors returned, in order, by the next calls of any kind.
    failures: VecDeque<ProviderError>,
}

#[derive(Clone, Default)]
pub struct InMemoryStackService {
    state: Arc<Mutex<State>>,
}

impl InMemoryStackService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_stack(&self, name: &StackName, status: StackStatus, template_body: &str) {
        let mut state = self.state.lock().await;
        state.stacks.insert(
            name.clone(),
            StoredStack {
                status: status.as_str().to_string(),
                status_reason: None,
                template_body: template_body.to_string(),
                capabilities: Vec::new(),
                tags: BTreeMap::new(),
                last_request_token: None,
            },
        );
    }

    pub async fn set_status(&self, name: &StackName, status: StackStatus, reason: Option<&str>) {
        let mut state = self.state.lock().await;
        if let Some(stack) = state.stacks.get_mut(name) {
            stack.status = status.as_str().to_string();
            stack.status_reason = reason.map(str::to_string);
        }
    }

    pub async fn set_raw_status(&self, name: &StackName, status: &str) {
        let mut state = self.state.lock().await;
        if let Some(stack) = state.stacks.get_mut(name) {
            stack.status = status.to_string();
        }
    }

    /// Move an in-flight create or update to its `*_COMPLETE` status.
    ///
    /// Returns the new status, or `None` if nothing was in flight.
    pub async fn finish_operation(&self, name: &StackName) -> Option<StackStatus> {
        let mut state = self.state.lock().await;
        let stack = state.stacks.get_mut(name)?;
        let done = match stack.status.parse().ok()? {
            StackStatus::CreateInProgress => StackStatus::CreateComplete,
            StackStatus::UpdateInProgress | StackStatus::UpdateCompleteCleanupInProgress => {
                StackStatus::UpdateComplete
            }
            _ => return None,
        };
        stack.status = done.as_str().to_string();
        stack.status_reason = None;
        Some(done)
    }

    /// Current status, if the stack exists and its status is a known one.
    pub async fn status_of(&self, name: &StackName) -> Option<StackStatus> {
        let state = self.state.lock().await;
        state.stacks.get(name).and_then(|s| s.status.parse().ok())
    }

    pub async fn tags_of(&self, name: &StackName) -> Option<BTreeMap<String, String>> {
        let state = self.state.lock().await;
        state.stacks.get(name).map(|s| s.tags.clone())
    }

    pub async fn calls(&self) -> Vec<StackCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of create and update calls received.
    pub async fn mutation_count(&self) -> usize {
        let state = self.state.lock().await;
        state
            .calls
            .iter()
            .filter(|c| !matches!(c, StackCall::Describe(_)))
            .count()
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ProviderError) {
        self.state.lock().await.failures.push_back(error);
    }
}

impl State {
    fn record(&mut self, call: StackCall) -> Result<(), ProviderError> {
        self.calls.push(call);
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StackService for InMemoryStackService {
    async fn describe_stack(
        &self,
        name: &StackName,
    ) -> Result<Option<StackDescription>, ProviderError> {
        let mut state = self.state.lock().await;
        state.record(StackCall::Describe(name.clone()))?;
        Ok(state.stacks.get(name).map(|s| StackDescription {
            name: name.clone(),
            status: s.status.clone(),
            status_reason: s.status_reason.clone(),
            tags: s.tags.clone(),
        }))
    }

    async fn create_stack(&self, request: &StackRequest) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        state.record(StackCall::Create(request.clone()))?;

        if let Some(existing) = state.stacks.get(&request.stack) {
            if existing.last_request_token.as_deref() == Some(request.client_request_token.as_str()) {
                return Ok(());
            }
            return Err(ProviderError::Rejected {
                code: "AlreadyExistsException".to_string(),
                message: format!("Stack [{}] already exists", request.stack),
            });
        }

        state.stacks.insert(
            request.stack.clone(),
            StoredStack {
                status: StackStatus::CreateInProgress.as_str().to_string(),
                status_reason: Some("User Initiated".to_string()),
                template_body: request.template_body.clone(),
                capabilities: request.capabilities.clone(),
                tags: request.tags.clone(),
                last_request_token: Some(request.client_request_token.clone()),
            },
        );
        Ok(())
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        state.record(StackCall::Update(request.clone()))?;

        let Some(stack) = state.stacks.get_mut(&request.stack) else {
            return Err(ProviderError::StackNotFound(request.stack.clone()));
        };

        if stack.last_request_token.as_deref() == Some(request.client_request_token.as_str()) {
            return Ok(());
        }

        let updatable = stack
            .status
            .parse::<StackStatus>()
            .is_ok_and(StackStatus::is_updatable);
        if !updatable {
            return Err(ProviderError::Rejected {
                code: "ValidationError".to_string(),
                message: format!(
                    "Stack:{} is in {} state and can not be updated.",
                    request.stack, stack.status
                ),
            });
        }

        if stack.template_body == request.template_body && stack.capabilities == request.capabilities {
            return Err(ProviderError::NoUpdates);
        }

        stack.status = StackStatus::UpdateInProgress.as_str().to_string();
        stack.status_reason = Some("User Initiated".to_string());
        stack.template_body = request.template_body.clone();
        stack.capabilities = request.capabilities.clone();
        stack.tags = request.tags.clone();
        stack.last_request_token = Some(request.client_request_token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobId, Template};

    fn request(job: &str, body: &str) -> StackRequest {
        let template = Template::parse("infra.json", body.to_string()).unwrap();
        StackRequest::for_job(&JobId::new(job), &StackName::new("web"), &template, &[])
    }

    #[tokio::test]
    async fn create_then_finish() {
        let stacks = InMemoryStackService::new();
        stacks.create_stack(&request("job-1", "{}")).await.unwrap();

        let web = StackName::new("web");
        assert_eq!(stacks.status_of(&web).await, Some(StackStatus::CreateInProgress));
        assert_eq!(stacks.finish_operation(&web).await, Some(StackStatus::CreateComplete));
        assert_eq!(stacks.finish_operation(&web).await, None);
        assert_eq!(
            stacks.tags_of(&web).await.unwrap().get("pipeline-job-id").map(String::as_str),
            Some("job-1")
        );
    }

    #[tokio::test]
    async fn repeated_create_with_same_token_is_idempotent() {
        let stacks = InMemoryStackService::new();
        stacks.create_stack(&request("job-1", "{}")).await.unwrap();
        stacks.create_stack(&request("job-1", "{}")).await.unwrap();

        let err = stacks.create_stack(&request("job-2", "{}")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { ref code, .. } if code == "AlreadyExistsException"));
    }

    #[tokio::test]
    async fn update_rules() {
        let stacks = InMemoryStackService::new();
        let web = StackName::new("web");

        let err = stacks.update_stack(&request("job-1", "{}")).await.unwrap_err();
        assert_eq!(err, ProviderError::StackNotFound(web.clone()));

        stacks.insert_stack(&web, StackStatus::CreateComplete, "{}").await;
        assert_eq!(
            stacks.update_stack(&request("job-1", "{}")).await.unwrap_err(),
            ProviderError::NoUpdates
        );

        stacks.update_stack(&request("job-2", r#"{"a":1}"#)).await.unwrap();
        assert_eq!(stacks.status_of(&web).await, Some(StackStatus::UpdateInProgress));

        let err = stacks.update_stack(&request("job-3", r#"{"a":2}"#)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { ref code, .. } if code == "ValidationError"));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let stacks = InMemoryStackService::new();
        let web = StackName::new("web");
        stacks.fail_next(ProviderError::Transport("reset".into())).await;

        assert!(stacks.describe_stack(&web).await.is_err());
        assert_eq!(stacks.describe_stack(&web).await, Ok(None));
        assert_eq!(stacks.calls().await.len(), 2);
        assert_eq!(stacks.mutation_count().await, 0);
    }
}
