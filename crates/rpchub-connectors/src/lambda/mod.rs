//! Synchronous function-invocation backend.
//!
//! Parameters are declared through resource tags of the form
//! `param:<name>:<flags>` where `<flags>` is a `/`-separated subset of
//! {required, int, bool} and the tag value carries the description. An
//! invocation serializes every argument into one flat JSON object and calls
//! the function request/response.

mod client;
mod http;

pub use client::{FunctionInfo, FunctionSummary, LambdaClient};
pub use http::LambdaHttpClient;

use async_trait::async_trait;
use rpchub_core::{
    matches_all, Argument, CallError, CallResult, ParamType, Parameter, RemoteCall, ResultMap,
    TagFilter,
};
use rpchub_registry::DiscoverySource;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

const TAG_SEPARATOR: char = ':';
const FLAG_SEPARATOR: char = '/';

/// A remote function exposed as a procedure.
pub struct LambdaRpc {
    client: Arc<dyn LambdaClient>,
    name: String,
    description: String,
    params: Vec<Parameter>,
}

impl LambdaRpc {
    /// Fetch the function's metadata and derive its parameter schema from
    /// its tag set.
    pub async fn new(client: Arc<dyn LambdaClient>, name: &str) -> CallResult<Self> {
        let info = client.get_function(name).await.map_err(CallError::schema_fetch)?;
        Ok(Self::from_info(client, info))
    }

    fn from_info(client: Arc<dyn LambdaClient>, info: FunctionInfo) -> Self {
        Self {
            client,
            name: info.name,
            description: info.description,
            params: params_from_tags(&info.tags),
        }
    }
}

#[async_trait]
impl RemoteCall for LambdaRpc {
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
        let mut payload = serde_json::Map::new();
        for arg in args {
            payload.insert(arg.name().to_string(), arg.value_json());
        }

        tracing::debug!(function = %self.name, "invoking function");
        let body = self
            .client
            .invoke(&self.name, JsonValue::Object(payload))
            .await
            .map_err(CallError::dispatch)?;

        let res: ResultMap = serde_json::from_slice(&body)?;
        Ok(res)
    }
}

/// Parse one `param:<name>:<flags>` tag into a parameter. Tags with any other
/// shape yield `None` and are ignored.
fn parse_param_tag(key: &str, value: &str) -> Option<Parameter> {
    let parts: Vec<&str> = key.split(TAG_SEPARATOR).collect();
    let [prefix, name, flags] = parts.as_slice() else {
        return None;
    };
    if *prefix != "param" || name.is_empty() {
        return None;
    }

    let flags: Vec<&str> = flags.split(FLAG_SEPARATOR).collect();
    let param_type = if flags.contains(&"int") {
        ParamType::Int
    } else if flags.contains(&"bool") {
        ParamType::Bool
    } else {
        ParamType::String
    };

    Some(Parameter {
        name: name.to_string(),
        param_type,
        description: value.to_string(),
        required: flags.contains(&"required"),
    })
}

/// Tag maps are unordered; sort by name so validation order is deterministic.
fn params_from_tags(tags: &HashMap<String, String>) -> Vec<Parameter> {
    let mut params: Vec<Parameter> =
        tags.iter().filter_map(|(k, v)| parse_param_tag(k, v)).collect();
    params.sort_by(|a, b| a.name.cmp(&b.name));
    params
}

/// List every function, keep those whose tags satisfy all filters, and build
/// one procedure per match. A function that matches the filters but fails
/// construction fails the whole discovery pass.
pub async fn discover(
    client: Arc<dyn LambdaClient>,
    filters: &[TagFilter],
) -> CallResult<Vec<LambdaRpc>> {
    let functions = client.list_functions().await.map_err(CallError::schema_fetch)?;

    let mut calls = Vec::new();
    for function in functions {
        let tags = client.list_tags(&function.arn).await.map_err(CallError::schema_fetch)?;
        if !matches_all(filters, &tags) {
            continue;
        }
        calls.push(LambdaRpc::new(Arc::clone(&client), &function.name).await?);
    }
    tracing::debug!(count = calls.len(), "discovered functions");
    Ok(calls)
}

/// Discovery source for one function backend, optionally tag-filtered.
pub struct LambdaSource {
    client: Arc<dyn LambdaClient>,
    filters: Vec<TagFilter>,
    label: String,
}

impl LambdaSource {
    pub fn new(client: Arc<dyn LambdaClient>, filters: Vec<TagFilter>) -> Self {
        Self { client, filters, label: "lambda".to_string() }
    }

    /// Label used in aggregated discovery errors; useful when several
    /// function sources are configured.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[async_trait]
impl DiscoverySource for LambdaSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn discover(&self) -> CallResult<Vec<Arc<dyn RemoteCall>>> {
        let calls = discover(Arc::clone(&self.client), &self.filters).await?;
        Ok(calls.into_iter().map(|c| Arc::new(c) as Arc<dyn RemoteCall>).collect())
    }
}
