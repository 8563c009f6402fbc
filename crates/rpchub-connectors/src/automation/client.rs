//! Client seam for the automation-document backend.

use crate::error::ClientResult;
use async_trait::async_trait;
use rpchub_core::ExecutionStatus;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub name: String,
    pub tags: HashMap<String, String>,
}

/// Point-in-time view of one automation execution. Output values are lists
/// of strings keyed by output name.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    pub status: ExecutionStatus,
    pub outputs: HashMap<String, Vec<String>>,
}

#[async_trait]
pub trait AutomationClient: Send + Sync {
    /// Fetch the document body as JSON text.
    async fn get_document(&self, name: &str) -> ClientResult<String>;

    async fn list_documents(&self) -> ClientResult<Vec<DocumentInfo>>;

    /// Start an execution and return its id. Every parameter value is a list
    /// of strings, the backend's native shape.
    async fn start_execution(
        &self,
        document: &str,
        parameters: &HashMap<String, Vec<String>>,
    ) -> ClientResult<String>;

    async fn get_execution(&self, execution_id: &str) -> ClientResult<ExecutionState>;
}
