//! Workflow-dispatch backend.
//!
//! Dispatching is fire-and-forget: the backend returns no run handle. The
//! adapter records the dispatch time, waits for a run created after it to
//! appear, takes the newest one, then waits for that run to reach a terminal
//! status and reports its jobs.

mod client;
mod http;
mod schema;

pub use client::{JobInfo, RunInfo, WorkflowClient, WorkflowInfo};
pub use http::GithubWorkflowClient;

use crate::poll::{poll_until, PollPolicy};
use async_trait::async_trait;
use chrono::Utc;
use rpchub_core::{
    Argument, CallError, CallResult, ExecutionStatus, Parameter, RemoteCall, ResultMap,
    FORMAT_STRING_KEY,
};
use rpchub_registry::DiscoverySource;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_GIT_REF: &str = "main";

/// Dispatched runs usually materialize within seconds.
const RUN_CREATION_POLL: PollPolicy = PollPolicy::new(Duration::from_secs(1), 10);
/// Runs themselves can take a while.
const COMPLETION_POLL: PollPolicy = PollPolicy::new(Duration::from_secs(3), 1000);

/// A dispatchable workflow exposed as a procedure.
pub struct WorkflowRpc {
    client: Arc<dyn WorkflowClient>,
    name: String,
    id: i64,
    git_ref: String,
    params: Vec<Parameter>,
    run_creation_poll: PollPolicy,
    completion_poll: PollPolicy,
}

impl std::fmt::Debug for WorkflowRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRpc")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("git_ref", &self.git_ref)
            .field("params", &self.params)
            .field("run_creation_poll", &self.run_creation_poll)
            .field("completion_poll", &self.completion_poll)
            .finish_non_exhaustive()
    }
}

impl WorkflowRpc {
    /// Look the workflow up by name and derive its parameter schema from the
    /// dispatch trigger of its definition file. Workflows without a dispatch
    /// trigger cannot be procedures and fail here.
    pub async fn new(client: Arc<dyn WorkflowClient>, workflow_name: &str) -> CallResult<Self> {
        let workflows = client.list_workflows().await.map_err(CallError::schema_fetch)?;
        let info = workflows
            .into_iter()
            .find(|w| w.name == workflow_name)
            .ok_or_else(|| {
                CallError::schema_fetch(format!("workflow {workflow_name} not found"))
            })?;
        Self::from_info(client, info).await
    }

    async fn from_info(client: Arc<dyn WorkflowClient>, info: WorkflowInfo) -> CallResult<Self> {
        let content =
            client.fetch_definition(&info.path).await.map_err(CallError::schema_fetch)?;
        let definition = schema::parse_definition(&content)?;
        let params = definition.dispatch_params()?;

        Ok(Self {
            client,
            name: info.name,
            id: info.id,
            git_ref: DEFAULT_GIT_REF.to_string(),
            params,
            run_creation_poll: RUN_CREATION_POLL,
            completion_poll: COMPLETION_POLL,
        })
    }

    /// Git ref dispatches run against. Defaults to `main`.
    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    pub fn with_run_creation_poll(mut self, policy: PollPolicy) -> Self {
        self.run_creation_poll = policy;
        self
    }

    pub fn with_completion_poll(mut self, policy: PollPolicy) -> Self {
        self.completion_poll = policy;
        self
    }
}

#[async_trait]
impl RemoteCall for WorkflowRpc {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        ""
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    async fn run(&self, args: &[Argument]) -> CallResult<ResultMap> {
        let mut inputs = serde_json::Map::new();
        for arg in args {
            inputs.insert(arg.name().to_string(), arg.value_json());
        }

        let dispatched_at = Utc::now();
        tracing::debug!(workflow = %self.name, git_ref = %self.git_ref, "dispatching workflow");
        self.client
            .dispatch(self.id, &self.git_ref, &inputs)
            .await
            .map_err(CallError::dispatch)?;

        // Several runs can show up in the window (another dispatch racing
        // ours); the newest by creation time is taken as ours.
        let run = poll_until(self.run_creation_poll, "dispatched run to appear", move || {
            async move {
                let runs = self
                    .client
                    .list_dispatch_runs_since(self.id, dispatched_at)
                    .await
                    .map_err(CallError::dispatch)?;
                Ok(runs.into_iter().max_by_key(|r| r.created_at))
            }
        })
        .await?;

        let run_id = run.id;
        let finished = poll_until(self.completion_poll, "workflow run to complete", move || {
            async move {
                let run = self.client.get_run(run_id).await.map_err(CallError::dispatch)?;
                Ok(run.status.is_terminal().then_some(run))
            }
        })
        .await?;

        if finished.status != ExecutionStatus::Completed {
            return Err(CallError::RunFailed { status: finished.status });
        }

        let jobs = self.client.list_jobs(run_id).await.map_err(CallError::dispatch)?;
        Ok(job_results(&finished.name, &jobs))
    }
}

/// One entry per job, keyed by job name, holding its raw status. The format
/// string shows a check mark for completed jobs and the status otherwise.
fn job_results(run_name: &str, jobs: &[JobInfo]) -> ResultMap {
    let mut format = format!("Workflow {run_name}:\n");
    let mut res = ResultMap::new();
    for job in jobs {
        if job.status == "completed" {
            format.push_str(&format!("✓ {}\n", job.name));
        } else {
            format.push_str(&format!("{}: {}\n", job.name, job.status));
        }
        res.insert(job.name.clone(), JsonValue::String(job.status.clone()));
    }
    res.insert(FORMAT_STRING_KEY.to_string(), JsonValue::String(format));
    res
}

/// Build one procedure per dispatchable workflow in the repository.
/// Workflows without a dispatch trigger are skipped; a definition that fails
/// to fetch or parse fails the whole discovery pass.
pub async fn discover(client: Arc<dyn WorkflowClient>) -> CallResult<Vec<WorkflowRpc>> {
    let workflows = client.list_workflows().await.map_err(CallError::schema_fetch)?;

    let mut calls = Vec::new();
    for info in workflows {
        let content =
            client.fetch_definition(&info.path).await.map_err(CallError::schema_fetch)?;
        let definition = schema::parse_definition(&content)?;
        if !definition.has_dispatch_trigger() {
            tracing::debug!(workflow = %info.name, "skipping workflow without dispatch trigger");
            continue;
        }
        calls.push(WorkflowRpc::from_info(Arc::clone(&client), info).await?);
    }
    tracing::debug!(count = calls.len(), "discovered workflows");
    Ok(calls)
}

/// Discovery source for one repository's workflows.
pub struct WorkflowSource {
    client: Arc<dyn WorkflowClient>,
    label: String,
}

impl WorkflowSource {
    pub fn new(client: Arc<dyn WorkflowClient>) -> Self {
        Self { client, label: "workflow".to_string() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[async_trait]
impl DiscoverySource for WorkflowSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
        let calls = discover(Arc::clone(&self.client)).await?;
        Ok(calls.into_iter().map(|c| Arc::new(c) as Arc<dyn RemoteCall>).collect())
    }
}
