//! Client seam for the synchronous function-invocation backend.

use crate::error::ClientResult;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Full metadata for one remote function.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub name: String,
    pub arn: String,
    pub description: String,
    pub tags: HashMap<String, String>,
}

/// Listing entry; tags are fetched separately.
#[derive(Debug, Clone)]
pub struct FunctionSummary {
    pub name: String,
    pub arn: String,
}

/// Operations the function adapter needs from its backend. Pagination is the
/// implementation's concern: `list_functions` returns the complete set.
#[async_trait]
pub trait LambdaClient: Send + Sync {
    async fn get_function(&self, name: &str) -> ClientResult<FunctionInfo>;

    async fn list_functions(&self) -> ClientResult<Vec<FunctionSummary>>;

    async fn list_tags(&self, arn: &str) -> ClientResult<HashMap<String, String>>;

    /// Invoke the function synchronously (request/response) and return the
    /// raw response payload.
    async fn invoke(&self, name: &str, payload: JsonValue) -> ClientResult<Vec<u8>>;
}
