//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock service clients injected, so the API can be exercised without
//! an extraction or automation service.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use rtw_core::{
    testing::{MockExtractor, MockRunner},
    AutomationServiceConfig, CertificateRunner, Config, ExtractionServiceConfig, Extractor,
    ServerConfig, Workflow, WorkflowConfig, DEFAULT_ARTIFACT_NAME,
};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use rtw_core::testing::fixtures;

const BOUNDARY: &str = "rtw-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_snapshot() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/api/v1/workflow").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock extractor - configure extraction results
    pub extractor: Arc<MockExtractor>,
    /// Mock runner - configure certificates and failures
    pub runner: Arc<MockRunner>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: Vec<u8>,
}

/// One multipart part for [`TestFixture::post_multipart`].
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0, // Not used for in-process testing
        },
        extraction: ExtractionServiceConfig {
            url: "http://extractor.invalid".to_string(),
            path: "/rtw/extract".to_string(),
            timeout_secs: 5,
            auth_token: Some("extract-secret".to_string()),
        },
        automation: AutomationServiceConfig {
            url: "http://runner.invalid".to_string(),
            path: "/rtw/run".to_string(),
            timeout_secs: 5,
            auth_token: None,
            default_filename: DEFAULT_ARTIFACT_NAME.to_string(),
        },
        workflow: WorkflowConfig::default(),
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        let extractor = Arc::new(MockExtractor::new());
        let runner = Arc::new(MockRunner::new());
        let config = test_config();

        let workflow = Arc::new(Workflow::new(
            Arc::clone(&extractor) as Arc<dyn Extractor>,
            Arc::clone(&runner) as Arc<dyn CertificateRunner>,
            config.workflow.clone(),
        ));

        let state = Arc::new(rtw_server::state::AppState::new(config, workflow));
        let router = rtw_server::api::create_router(state);

        Self {
            router,
            extractor,
            runner,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with an empty body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a multipart/form-data POST.
    pub async fn post_multipart(&self, path: &str, parts: &[Part<'_>]) -> TestResponse {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, part.filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(
                format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes(),
            );
            body.extend_from_slice(part.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Send a POST with a raw body and content type.
    pub async fn post_raw(&self, path: &str, content_type: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Upload both fixture documents to the extract endpoint.
    pub async fn extract_fixture_documents(&self) -> TestResponse {
        self.post_multipart(
            "/api/v1/workflow/extract",
            &[
                Part {
                    name: "share_file",
                    filename: "share_code.pdf",
                    content_type: "application/pdf",
                    bytes: fixtures::PDF_BYTES,
                },
                Part {
                    name: "dob_file",
                    filename: "passport.png",
                    content_type: "image/png",
                    bytes: fixtures::PNG_BYTES,
                },
            ],
        )
        .await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            raw: body_bytes.to_vec(),
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
