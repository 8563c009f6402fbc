//! Client seam for the workflow-dispatch backend.

use crate::error::ClientResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rpchub_core::ExecutionStatus;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone)]
pub struct WorkflowInfo {
    pub id: i64,
    pub name: String,
    /// Repository path of the definition file.
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct RunInfo {
    pub id: i64,
    pub name: String,
    pub status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct JobInfo {
    pub name: String,
    /// Raw backend status string, reported verbatim in results.
    pub status: String,
}

#[async_trait]
pub trait WorkflowClient: Send + Sync {
    async fn list_workflows(&self) -> ClientResult<Vec<WorkflowInfo>>;

    /// Fetch the decoded text of a workflow definition file.
    async fn fetch_definition(&self, path: &str) -> ClientResult<String>;

    /// Fire a dispatch event. The backend gives no handle back; the run has
    /// to be found afterwards through [`list_dispatch_runs_since`].
    ///
    /// [`list_dispatch_runs_since`]: WorkflowClient::list_dispatch_runs_since
    async fn dispatch(
        &self,
        workflow_id: i64,
        git_ref: &str,
        inputs: &serde_json::Map<String, JsonValue>,
    ) -> ClientResult<()>;

    /// Runs of this workflow created by a dispatch event after `since`.
    async fn list_dispatch_runs_since(
        &self,
        workflow_id: i64,
        since: DateTime<Utc>,
    ) -> ClientResult<Vec<RunInfo>>;

    async fn get_run(&self, run_id: i64) -> ClientResult<RunInfo>;

    async fn list_jobs(&self, run_id: i64) -> ClientResult<Vec<JobInfo>>;
}
