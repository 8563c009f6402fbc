//! REST client for an AWS-style function service. Request signing is
//! delegated to the configured [`RequestSigner`].

use super::client::{FunctionInfo, FunctionSummary, LambdaClient};
use crate::error::{ClientError, ClientResult};
use crate::signer::RequestSigner;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

const FUNCTIONS_API: &str = "2015-03-31/functions";
const TAGS_API: &str = "2017-03-31/tags";
const PAGE_SIZE: &str = "50";

pub struct LambdaHttpClient {
    http: reqwest::Client,
    base_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl LambdaHttpClient {
    /// `base_url` is the service endpoint, e.g.
    /// `https://lambda.eu-west-1.amazonaws.com/`.
    pub fn new(base_url: Url, signer: Arc<dyn RequestSigner>) -> Self {
        Self { http: reqwest::Client::new(), base_url, signer }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    async fn send(&self, request: reqwest::Request) -> ClientResult<reqwest::Response> {
        let request = self.signer.sign(request)?;
        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct FunctionConfiguration {
    #[serde(rename = "FunctionName")]
    function_name: String,
    #[serde(rename = "FunctionArn")]
    function_arn: String,
    #[serde(default, rename = "Description")]
    description: String,
}

#[derive(Debug, Deserialize)]
struct GetFunctionResponse {
    #[serde(rename = "Configuration")]
    configuration: FunctionConfiguration,
    #[serde(default, rename = "Tags")]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListFunctionsResponse {
    #[serde(default, rename = "Functions")]
    functions: Vec<FunctionConfiguration>,
    #[serde(rename = "NextMarker")]
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListTagsResponse {
    #[serde(default, rename = "Tags")]
    tags: HashMap<String, String>,
}

#[async_trait]
impl LambdaClient for LambdaHttpClient {
    async fn get_function(&self, name: &str) -> ClientResult<FunctionInfo> {
        let url = self.base_url.join(&format!("{FUNCTIONS_API}/{name}"))?;
        let request = self.http.get(url).build()?;
        let body: GetFunctionResponse = self.send(request).await?.json().await?;
        Ok(FunctionInfo {
            name: body.configuration.function_name,
            arn: body.configuration.function_arn,
            description: body.configuration.description,
            tags: body.tags,
        })
    }

    async fn list_functions(&self) -> ClientResult<Vec<FunctionSummary>> {
        let url = self.base_url.join(FUNCTIONS_API)?;
        let mut functions = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut builder =
                self.http.get(url.clone()).query(&[("MaxItems", PAGE_SIZE)]);
            if let Some(marker) = &marker {
                builder = builder.query(&[("Marker", marker.as_str())]);
            }
            let body: ListFunctionsResponse =
                self.send(builder.build()?).await?.json().await?;

            functions.extend(body.functions.into_iter().map(|f| FunctionSummary {
                name: f.function_name,
                arn: f.function_arn,
            }));

            match body.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(functions)
    }

    async fn list_tags(&self, arn: &str) -> ClientResult<HashMap<String, String>> {
        let url = self.base_url.join(&format!("{TAGS_API}/{arn}"))?;
        let request = self.http.get(url).build()?;
        let body: ListTagsResponse = self.send(request).await?.json().await?;
        Ok(body.tags)
    }

    async fn invoke(&self, name: &str, payload: JsonValue) -> ClientResult<Vec<u8>> {
        let url = self.base_url.join(&format!("{FUNCTIONS_API}/{name}/invocations"))?;
        let request = self
            .http
            .post(url)
            .header("X-Amz-Invocation-Type", "RequestResponse")
            .json(&payload)
            .build()?;
        let response = self.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::NoSignature;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> LambdaHttpClient {
        LambdaHttpClient::new(Url::parse(&server.base_url()).unwrap(), Arc::new(NoSignature))
    }

    #[tokio::test]
    async fn get_function_parses_configuration_and_tags() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/2015-03-31/functions/greet");
            then.status(200).json_body(json!({
                "Configuration": {
                    "FunctionName": "greet",
                    "FunctionArn": "arn:fn:greet",
                    "Description": "Say hello"
                },
                "Tags": {"param:name:required": "Who to greet"}
            }));
        });

        let info = client(&server).get_function("greet").await.unwrap();
        mock.assert();
        assert_eq!(info.name, "greet");
        assert_eq!(info.arn, "arn:fn:greet");
        assert_eq!(info.description, "Say hello");
        assert_eq!(info.tags.get("param:name:required").unwrap(), "Who to greet");
    }

    #[tokio::test]
    async fn list_functions_follows_pagination_markers() {
        let server = MockServer::start();
        let page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/2015-03-31/functions")
                .query_param("Marker", "next-page");
            then.status(200).json_body(json!({
                "Functions": [{"FunctionName": "b", "FunctionArn": "arn:fn:b"}]
            }));
        });
        let page1 = server.mock(|when, then| {
            when.method(GET).path("/2015-03-31/functions").matches(|req| {
                req.query_params
                    .as_ref()
                    .map_or(true, |params| params.iter().all(|(k, _)| k != "Marker"))
            });
            then.status(200).json_body(json!({
                "Functions": [{"FunctionName": "a", "FunctionArn": "arn:fn:a"}],
                "NextMarker": "next-page"
            }));
        });

        let functions = client(&server).list_functions().await.unwrap();
        page1.assert();
        page2.assert();
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn invoke_posts_payload_request_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2015-03-31/functions/greet/invocations")
                .header("X-Amz-Invocation-Type", "RequestResponse")
                .json_body(json!({"name": "world"}));
            then.status(200).json_body(json!({"greeting": "hi"}));
        });

        let body =
            client(&server).invoke("greet", json!({"name": "world"})).await.unwrap();
        mock.assert();
        let parsed: JsonValue = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, json!({"greeting": "hi"}));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/2015-03-31/functions/missing");
            then.status(404).body("function not found");
        });

        let err = client(&server).get_function("missing").await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "function not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
