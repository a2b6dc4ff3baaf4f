use crate::{
    config::Config,
    constants::{HEALTH_ENDPOINT, QUERY_ENDPOINT, UPLOAD_ENDPOINT, UPLOAD_FIELD},
    errors::{BeautiragError, BeautiragResult},
    logging::log_api_call,
    models::ApiCallLog,
};
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Instant;

/// Body of `POST /query/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub model_name: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub processed_files: Option<u32>,
    #[serde(default)]
    pub failed_files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    message: String,
}

/// Error payload shared by both endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// A file ready to go into the multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Thin client over the RAG backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Probes `GET /` and returns the backend's greeting.
    pub async fn health(&self) -> BeautiragResult<String> {
        let started = Instant::now();
        let result = self.http.get(self.url(HEALTH_ENDPOINT)).send().await;
        let body: HealthResponse =
            finish(HEALTH_ENDPOINT, "health check".to_string(), started, result).await?;
        Ok(body.message)
    }

    /// Sends one question to `POST /query/`.
    pub async fn query(&self, request: &QueryRequest) -> BeautiragResult<QueryResponse> {
        let summary = format!(
            "model={} key={} query_chars={}",
            request.model_name,
            if request.api_key.is_some() { "set" } else { "unset" },
            request.query.chars().count()
        );

        let started = Instant::now();
        let result = self
            .http
            .post(self.url(QUERY_ENDPOINT))
            .json(request)
            .send()
            .await;
        finish(QUERY_ENDPOINT, summary, started, result).await
    }

    /// Sends a whole batch as one multipart form to `POST /upload/`.
    pub async fn upload(&self, files: Vec<UploadFile>) -> BeautiragResult<UploadResponse> {
        let summary = format!(
            "files={} bytes={}",
            files.len(),
            files.iter().map(|f| f.bytes.len()).sum::<usize>()
        );

        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(file.mime)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        let started = Instant::now();
        let result = self
            .http
            .post(self.url(UPLOAD_ENDPOINT))
            .multipart(form)
            .send()
            .await;
        finish(UPLOAD_ENDPOINT, summary, started, result).await
    }
}

/// Logs the call and turns the raw response into the typed body or an error.
async fn finish<T: DeserializeOwned>(
    endpoint: &str,
    request_summary: String,
    started: Instant,
    result: Result<Response, reqwest::Error>,
) -> BeautiragResult<T> {
    let status = result.as_ref().map(|r| r.status().as_u16()).unwrap_or(0);
    log_api_call(&ApiCallLog {
        timestamp: Utc::now(),
        endpoint: endpoint.to_string(),
        request_summary,
        response_status: status,
        response_time_ms: started.elapsed().as_millis(),
    });

    let response = result?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        // Non-JSON error bodies still count as HTTP failures, just without a detail.
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .unwrap_or_default()
            .detail;
        log::warn!("{} failed with {}: {:?}", endpoint, status, detail);
        return Err(BeautiragError::http_error(status.as_u16(), detail));
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        log::warn!("{} returned an unreadable body: {}", endpoint, e);
        BeautiragError::transport_error(format!("Malformed response from backend: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_query_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query/"))
            .and(body_json(json!({
                "query": "what is the answer",
                "model_name": "gpt-4o",
                "api_key": "sk-test"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "42" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let response = client
            .query(&QueryRequest {
                query: "what is the answer".to_string(),
                model_name: "gpt-4o".to_string(),
                api_key: Some("sk-test".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response.response, "42");
    }

    #[tokio::test]
    async fn test_query_sends_null_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query/"))
            .and(body_json(json!({
                "query": "hi",
                "model_name": "llama3",
                "api_key": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hello" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&format!("{}/", mock_server.uri()));
        let response = client
            .query(&QueryRequest {
                query: "hi".to_string(),
                model_name: "llama3".to_string(),
                api_key: None,
            })
            .await
            .unwrap();

        assert_eq!(response.response, "hello");
    }

    #[tokio::test]
    async fn test_query_http_error_carries_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query/"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "detail": "index not ready" })),
            )
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let err = client
            .query(&QueryRequest {
                query: "q".to_string(),
                model_name: "gpt-4o".to_string(),
                api_key: None,
            })
            .await
            .unwrap_err();

        match err {
            BeautiragError::Http { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail.as_deref(), Some("index not ready"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_with_plain_text_body_has_no_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let err = client
            .query(&QueryRequest {
                query: "q".to_string(),
                model_name: "gpt-4o".to_string(),
                api_key: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BeautiragError::Http { status: 502, detail: None }));
    }

    #[tokio::test]
    async fn test_success_with_malformed_body_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/query/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "42" })))
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let err = client
            .query(&QueryRequest {
                query: "q".to_string(),
                model_name: "gpt-4o".to_string(),
                api_key: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BeautiragError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Nothing listens on the discard port.
        let client = BackendClient::new("http://127.0.0.1:9");
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, BeautiragError::Transport(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_batch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Processed 2 file(s) successfully.",
                "processed_files": 2,
                "failed_files": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        let response = client
            .upload(vec![
                UploadFile {
                    name: "notes.txt".to_string(),
                    mime: "text/plain",
                    bytes: b"hello".to_vec(),
                },
                UploadFile {
                    name: "paper.pdf".to_string(),
                    mime: "application/pdf",
                    bytes: b"%PDF-1.4".to_vec(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(response.message.as_deref(), Some("Processed 2 file(s) successfully."));
        assert_eq!(response.processed_files, Some(2));

        let requests = mock_server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body);
        assert_eq!(body.matches("name=\"files\"").count(), 2);
        assert!(body.contains("filename=\"notes.txt\""));
        assert!(body.contains("filename=\"paper.pdf\""));
        assert!(body.contains("application/pdf"));
    }

    #[tokio::test]
    async fn test_health_returns_greeting() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "BeautiRAG API is running!" })),
            )
            .mount(&mock_server)
            .await;

        let client = BackendClient::new(&mock_server.uri());
        assert_eq!(client.health().await.unwrap(), "BeautiRAG API is running!");
    }
}
