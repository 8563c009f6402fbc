//! Automation-document backend.
//!
//! A document's JSON body declares its parameters; string parameters without
//! a default are required (defaults only appear on optional ones). Running
//! starts an execution and polls until it reaches a terminal status, then
//! merges the JSON-decoded first value of every output into the result.

mod client;
mod http;

pub use client::{AutomationClient, DocumentInfo, ExecutionState};
pub use http::SsmAutomationClient;

use crate::poll::{poll_until, PollPolicy};
use async_trait::async_trait;
use indexmap::IndexMap;
use rpchub_core::{
    matches_all, Argument, CallError, CallResult, ExecutionStatus, ParamType, Parameter,
    RemoteCall, ResultMap, TagFilter,
};
use rpchub_registry::DiscoverySource;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const STATUS_POLL: PollPolicy = PollPolicy::new(Duration::from_secs(1), 1000);

#[derive(Debug, Deserialize)]
struct DocumentContent {
    #[serde(default, alias = "Description")]
    description: String,
    #[serde(default, alias = "Parameters")]
    parameters: IndexMap<String, DocumentParameter>,
}

#[derive(Debug, Deserialize)]
struct DocumentParameter {
    #[serde(rename = "type", alias = "Type")]
    param_type: String,
    #[serde(default, alias = "Description")]
    description: String,
    #[serde(default, alias = "Default")]
    default: Option<JsonValue>,
}

/// String and boolean parameters become procedure parameters, in document
/// order. Other parameter types (string lists, maps) have no argument
/// representation and are skipped.
fn params_from_content(content: &DocumentContent) -> Vec<Parameter> {
    content
        .parameters
        .iter()
        .filter_map(|(name, p)| match p.param_type.to_lowercase().as_str() {
            "string" => Some(Parameter {
                name: name.clone(),
                param_type: ParamType::String,
                description: p.description.clone(),
                required: p.default.is_none(),
            }),
            "bool" | "boolean" => Some(Parameter {
                name: name.clone(),
                param_type: ParamType::Bool,
                description: p.description.clone(),
                required: false,
            }),
            _ => None,
        })
        .collect()
}

/// An automation document exposed as a procedure.
pub struct AutomationRpc {
    client: Arc<dyn AutomationClient>,
    name: String,
    description: String,
    params: Vec<Parameter>,
    status_poll: PollPolicy,
}

impl std::fmt::Debug for AutomationRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationRpc")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("status_poll", &self.status_poll)
            .finish_non_exhaustive()
    }
}

impl AutomationRpc {
    /// Fetch the document and derive the parameter schema from its body.
    pub async fn new(client: Arc<dyn AutomationClient>, name: &str) -> CallResult<Self> {
        let body = client.get_document(name).await.map_err(CallError::schema_fetch)?;
        let content: DocumentContent = serde_json::from_str(&body)
            .map_err(|e| CallError::SchemaParse(format!("document {name}: {e}")))?;

        Ok(Self {
            client,
            name: name.to_string(),
            description: content.description.clone(),
            params: params_from_content(&content),
            status_poll: STATUS_POLL,
        })
    }

    pub fn with_status_poll(mut self, policy: PollPolicy) -> Self {
        self.status_poll = policy;
        self
    }
}

#[async_trait]
impl RemoteCall for AutomationRpc {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    async fn run(&self, args: &[Argument]) -> CallResult<ResultMap> {
        // The backend only accepts string-list parameter values; other
        // argument kinds have no wire shape here.
        let mut parameters: HashMap<String, Vec<String>> = HashMap::new();
        for arg in args {
            if let Argument::String { name, value } = arg {
                parameters.insert(name.clone(), vec![value.clone()]);
            }
        }

        tracing::debug!(document = %self.name, "starting automation execution");
        let execution_id = self
            .client
            .start_execution(&self.name, &parameters)
            .await
            .map_err(CallError::dispatch)?;

        let id = execution_id.as_str();
        let state =
            poll_until(self.status_poll, "automation execution to complete", move || {
                async move {
                    let state =
                        self.client.get_execution(id).await.map_err(CallError::dispatch)?;
                    Ok(state.status.is_terminal().then_some(state))
                }
            })
            .await?;

        if state.status != ExecutionStatus::Completed {
            return Err(CallError::RunFailed { status: state.status });
        }

        let mut res = ResultMap::new();
        for values in state.outputs.values() {
            let Some(first) = values.first() else { continue };
            let decoded: ResultMap = serde_json::from_str(first)?;
            res.extend(decoded);
        }
        Ok(res)
    }
}

/// List every document, keep those whose tags satisfy all filters, and build
/// one procedure per match. A matching document that fails to fetch or parse
/// fails the whole discovery pass.
pub async fn discover(
    client: Arc<dyn AutomationClient>,
    filters: &[TagFilter],
) -> CallResult<Vec<AutomationRpc>> {
    let documents = client.list_documents().await.map_err(CallError::schema_fetch)?;

    let mut calls = Vec::new();
    for document in documents {
        if !matches_all(filters, &document.tags) {
            continue;
        }
        calls.push(AutomationRpc::new(Arc::clone(&client), &document.name).await?);
    }
    tracing::debug!(count = calls.len(), "discovered automation documents");
    Ok(calls)
}

/// Discovery source for one automation backend, optionally tag-filtered.
pub struct AutomationSource {
    client: Arc<dyn AutomationClient>,
    filters: Vec<TagFilter>,
    label: String,
}

impl AutomationSource {
    pub fn new(client: Arc<dyn AutomationClient>, filters: Vec<TagFilter>) -> Self {
        Self { client, filters, label: "automation".to_string() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[async_trait]
impl DiscoverySource for AutomationSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
        let calls = discover(Arc::clone(&self.client), &self.filters).await?;
        Ok(calls.into_iter().map(|c| Arc::new(c) as Arc<dyn RemoteCall>).collect())
    }
}
