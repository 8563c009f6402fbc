//! REST client for a GitHub-style workflow backend, scoped to one
//! owner/repository pair.

use super::client::{JobInfo, RunInfo, WorkflowClient, WorkflowInfo};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use url::Url;

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const USER_AGENT_HEADER: &str = "rpchub";
const DISPATCH_EVENT: &str = "workflow_dispatch";

pub struct GithubWorkflowClient {
    http: reqwest::Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubWorkflowClient {
    /// `base_url` is the API root, e.g. `https://api.github.com/`.
    pub fn new(
        base_url: Url,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            owner: owner.into(),
            repo: repo.into(),
            token,
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn repo_url(&self, suffix: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(&format!("repos/{}/{}/{suffix}", self.owner, self.repo))?)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let mut builder = builder
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .header(reqwest::header::USER_AGENT, USER_AGENT_HEADER);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = self.http.execute(builder.build()?).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowEntry {
    id: i64,
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct ListWorkflowsResponse {
    #[serde(default)]
    workflows: Vec<WorkflowEntry>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct RunEntry {
    id: i64,
    name: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ListRunsResponse {
    #[serde(default)]
    workflow_runs: Vec<RunEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    name: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ListJobsResponse {
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

impl From<RunEntry> for RunInfo {
    fn from(run: RunEntry) -> Self {
        Self {
            id: run.id,
            name: run.name,
            status: map_run_status(&run.status),
            created_at: run.created_at,
        }
    }
}

/// Run statuses the backend reports, folded into the shared vocabulary.
/// Anything unrecognized is treated as failed rather than waited on forever.
fn map_run_status(status: &str) -> rpchub_core::ExecutionStatus {
    use rpchub_core::ExecutionStatus::*;
    match status {
        "queued" | "waiting" | "requested" | "pending" => Pending,
        "in_progress" => InProgress,
        "completed" => Completed,
        _ => Failed,
    }
}

#[async_trait]
impl WorkflowClient for GithubWorkflowClient {
    async fn list_workflows(&self) -> ClientResult<Vec<WorkflowInfo>> {
        let url = self.repo_url("actions/workflows")?;
        let body: ListWorkflowsResponse =
            self.send(self.http.get(url).query(&[("per_page", "100")])).await?.json().await?;
        Ok(body
            .workflows
            .into_iter()
            .map(|w| WorkflowInfo { id: w.id, name: w.name, path: w.path })
            .collect())
    }

    async fn fetch_definition(&self, path: &str) -> ClientResult<String> {
        let url = self.repo_url(&format!("contents/{path}"))?;
        let body: ContentsResponse = self.send(self.http.get(url)).await?.json().await?;

        match body.encoding.as_str() {
            "base64" => {
                // Content comes line-wrapped.
                let packed: String =
                    body.content.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(packed)
                    .map_err(|e| ClientError::Decode(format!("{path}: {e}")))?;
                String::from_utf8(bytes).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
            }
            other => Err(ClientError::Decode(format!("{path}: unsupported encoding {other}"))),
        }
    }

    async fn dispatch(
        &self,
        workflow_id: i64,
        git_ref: &str,
        inputs: &serde_json::Map<String, JsonValue>,
    ) -> ClientResult<()> {
        let url = self.repo_url(&format!("actions/workflows/{workflow_id}/dispatches"))?;
        let payload = json!({ "ref": git_ref, "inputs": inputs });
        self.send(self.http.post(url).json(&payload)).await?;
        Ok(())
    }

    async fn list_dispatch_runs_since(
        &self,
        workflow_id: i64,
        since: DateTime<Utc>,
    ) -> ClientResult<Vec<RunInfo>> {
        let url = self.repo_url(&format!("actions/workflows/{workflow_id}/runs"))?;
        let created = format!(">{}", since.to_rfc3339_opts(SecondsFormat::Secs, true));
        let body: ListRunsResponse = self
            .send(
                self.http
                    .get(url)
                    .query(&[("event", DISPATCH_EVENT), ("created", created.as_str())]),
            )
            .await?
            .json()
            .await?;
        Ok(body.workflow_runs.into_iter().map(RunInfo::from).collect())
    }

    async fn get_run(&self, run_id: i64) -> ClientResult<RunInfo> {
        let url = self.repo_url(&format!("actions/runs/{run_id}"))?;
        let run: RunEntry = self.send(self.http.get(url)).await?.json().await?;
        Ok(run.into())
    }

    async fn list_jobs(&self, run_id: i64) -> ClientResult<Vec<JobInfo>> {
        let url = self.repo_url(&format!("actions/runs/{run_id}/jobs"))?;
        let body: ListJobsResponse = self.send(self.http.get(url)).await?.json().await?;
        Ok(body
            .jobs
            .into_iter()
            .map(|j| JobInfo { name: j.name, status: j.status })
            .collect())
    }
}
