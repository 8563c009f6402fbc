//! Client for an SSM-style automation backend. The protocol is
//! target-header RPC: every call is a POST to the service root with an
//! `X-Amz-Target` header naming the operation.

use super::client::{AutomationClient, DocumentInfo, ExecutionState};
use crate::error::{ClientError, ClientResult};
use crate::signer::RequestSigner;
use async_trait::async_trait;
use rpchub_core::ExecutionStatus;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

const TARGET_PREFIX: &str = "AmazonSSM";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const PAGE_SIZE: u32 = 50;

pub struct SsmAutomationClient {
    http: reqwest::Client,
    base_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl SsmAutomationClient {
    /// `base_url` is the service endpoint, e.g.
    /// `https://ssm.eu-west-1.amazonaws.com/`.
    pub fn new(base_url: Url, signer: Arc<dyn RequestSigner>) -> Self {
        Self { http: reqwest::Client::new(), base_url, signer }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    async fn call(&self, operation: &str, body: &JsonValue) -> ClientResult<reqwest::Response> {
        let request = self
            .http
            .post(self.base_url.clone())
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(serde_json::to_vec(body)?)
            .build()?;
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
struct GetDocumentResponse {
    #[serde(rename = "Content")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct DocumentIdentifier {
    #[serde(rename = "Name")]
    name: String,
    #[serde(default, rename = "Tags")]
    tags: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default, rename = "DocumentIdentifiers")]
    document_identifiers: Vec<DocumentIdentifier>,
    #[serde(rename = "NextToken")]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StartExecutionResponse {
    #[serde(rename = "AutomationExecutionId")]
    automation_execution_id: String,
}

#[derive(Debug, Deserialize)]
struct AutomationExecution {
    #[serde(rename = "AutomationExecutionStatus")]
    status: String,
    #[serde(default, rename = "Outputs")]
    outputs: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GetExecutionResponse {
    #[serde(rename = "AutomationExecution")]
    automation_execution: AutomationExecution,
}

/// Execution statuses the backend reports, folded into the shared
/// vocabulary. Anything unrecognized is treated as failed.
fn map_execution_status(status: &str) -> ExecutionStatus {
    match status {
        "Pending" => ExecutionStatus::Pending,
        "InProgress" | "Waiting" => ExecutionStatus::InProgress,
        "Success" => ExecutionStatus::Completed,
        "TimedOut" => ExecutionStatus::TimedOut,
        _ => ExecutionStatus::Failed,
    }
}

#[async_trait]
impl AutomationClient for SsmAutomationClient {
    async fn get_document(&self, name: &str) -> ClientResult<String> {
        let body = json!({ "Name": name, "DocumentFormat": "JSON" });
        let response: GetDocumentResponse =
            self.call("GetDocument", &body).await?.json().await?;
        Ok(response.content)
    }

    async fn list_documents(&self) -> ClientResult<Vec<DocumentInfo>> {
        let mut documents = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut body = json!({ "MaxResults": PAGE_SIZE });
            if let Some(token) = &token {
                body["NextToken"] = json!(token);
            }
            let response: ListDocumentsResponse =
                self.call("ListDocuments", &body).await?.json().await?;

            documents.extend(response.document_identifiers.into_iter().map(|d| {
                DocumentInfo {
                    name: d.name,
                    tags: d.tags.into_iter().map(|t| (t.key, t.value)).collect(),
                }
            }));

            match response.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn start_execution(
        &self,
        document: &str,
        parameters: &HashMap<String, Vec<String>>,
    ) -> ClientResult<String> {
        let body = json!({ "DocumentName": document, "Parameters": parameters });
        let response: StartExecutionResponse =
            self.call("StartAutomationExecution", &body).await?.json().await?;
        Ok(response.automation_execution_id)
    }

    async fn get_execution(&self, execution_id: &str) -> ClientResult<ExecutionState> {
        let body = json!({ "AutomationExecutionId": execution_id });
        let response: GetExecutionResponse =
            self.call("GetAutomationExecution", &body).await?.json().await?;
        let execution = response.automation_execution;
        Ok(ExecutionState {
            status: map_execution_status(&execution.status),
            outputs: execution.outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::NoSignature;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> SsmAutomationClient {
        SsmAutomationClient::new(Url::parse(&server.base_url()).unwrap(), Arc::new(NoSignature))
    }

    #[test]
    fn execution_statuses_fold_into_shared_vocabulary() {
        assert_eq!(map_execution_status("Pending"), ExecutionStatus::Pending);
        assert_eq!(map_execution_status("InProgress"), ExecutionStatus::InProgress);
        assert_eq!(map_execution_status("Waiting"), ExecutionStatus::InProgress);
        assert_eq!(map_execution_status("Success"), ExecutionStatus::Completed);
        assert_eq!(map_execution_status("TimedOut"), ExecutionStatus::TimedOut);
        assert_eq!(map_execution_status("Cancelled"), ExecutionStatus::Failed);
        assert_eq!(map_execution_status("Failed"), ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn get_document_targets_operation_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("X-Amz-Target", "AmazonSSM.GetDocument")
                .header("Content-Type", CONTENT_TYPE)
                .json_body(json!({"Name": "restart-service", "DocumentFormat": "JSON"}));
            then.status(200).json_body(json!({"Content": "{\"parameters\": {}}"}));
        });

        let content = client(&server).get_document("restart-service").await.unwrap();
        mock.assert();
        assert_eq!(content, "{\"parameters\": {}}");
    }

    #[tokio::test]
    async fn list_documents_follows_next_tokens_and_maps_tags() {
        let server = MockServer::start();
        let page2 = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("X-Amz-Target", "AmazonSSM.ListDocuments")
                .json_body(json!({"MaxResults": 50, "NextToken": "next-page"}));
            then.status(200).json_body(json!({
                "DocumentIdentifiers": [{"Name": "b"}]
            }));
        });
        let page1 = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("X-Amz-Target", "AmazonSSM.ListDocuments")
                .json_body(json!({"MaxResults": 50}));
            then.status(200).json_body(json!({
                "DocumentIdentifiers": [{
                    "Name": "a",
                    "Tags": [{"Key": "rpc", "Value": "true"}]
                }],
                "NextToken": "next-page"
            }));
        });

        let documents = client(&server).list_documents().await.unwrap();
        page1.assert();
        page2.assert();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(documents[0].tags.get("rpc").unwrap(), "true");
        assert!(documents[1].tags.is_empty());
    }

    #[tokio::test]
    async fn start_execution_returns_execution_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("X-Amz-Target", "AmazonSSM.StartAutomationExecution")
                .json_body(json!({
                    "DocumentName": "restart-service",
                    "Parameters": {"service": ["api"]}
                }));
            then.status(200).json_body(json!({"AutomationExecutionId": "exec-123"}));
        });

        let parameters =
            HashMap::from([("service".to_string(), vec!["api".to_string()])]);
        let id =
            client(&server).start_execution("restart-service", &parameters).await.unwrap();
        mock.assert();
        assert_eq!(id, "exec-123");
    }

    #[tokio::test]
    async fn get_execution_parses_status_and_outputs() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header("X-Amz-Target", "AmazonSSM.GetAutomationExecution")
                .json_body(json!({"AutomationExecutionId": "exec-123"}));
            then.status(200).json_body(json!({
                "AutomationExecution": {
                    "AutomationExecutionStatus": "Success",
                    "Outputs": {"step.result": ["{\"ok\": true}"]}
                }
            }));
        });

        let state = client(&server).get_execution("exec-123").await.unwrap();
        assert_eq!(state.status, ExecutionStatus::Completed);
        assert_eq!(
            state.outputs.get("step.result").unwrap(),
            &vec!["{\"ok\": true}".to_string()]
        );
    }

    #[tokio::test]
    async fn non_success_status_surfaces_as_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/");
            then.status(400).body("invalid document");
        });

        let err = client(&server).get_document("broken").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
    }
}
