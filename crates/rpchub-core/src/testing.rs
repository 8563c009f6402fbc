//! Test double for the [`RemoteCall`](crate::call::RemoteCall) contract.

use crate::call::RemoteCall;
use crate::error::CallResult;
use crate::types::{Argument, Parameter, ResultMap};
use async_trait::async_trait;

/// A trivial call with a fixed schema and a canned result. Used by registry
/// and renderer tests, and handy as a stand-in while wiring new sources.
#[derive(Debug, Clone, Default)]
pub struct StaticCall {
    name: String,
    description: String,
    params: Vec<Parameter>,
    result: ResultMap,
}

impl StaticCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    pub fn with_result(mut self, result: ResultMap) -> Self {
        self.result = result;
        self
    }
}

#[async_trait]
impl RemoteCall for StaticCall {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn params(&self) -> &[Parameter] {
        &self.params
    }

    async fn run(&self, _args: &[Argument]) -> CallResult<ResultMap> {
        Ok(self.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn static_call_returns_its_canned_result() {
        let mut result = ResultMap::new();
        result.insert("ok".to_string(), json!(true));
        let call = StaticCall::new("noop").with_result(result.clone());

        assert_eq!(call.name(), "noop");
        assert_eq!(call.run(&[]).await.unwrap(), result);
    }
}
