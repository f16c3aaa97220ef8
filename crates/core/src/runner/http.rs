//! HTTP automation client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header::CONTENT_DISPOSITION, Client};
use tracing::{debug, warn};

use crate::config::AutomationServiceConfig;
use crate::fields::RunRequest;
use crate::metrics::{EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS};

use super::{artifact_filename, Artifact, CertificateRunner, RunError, MAX_ARTIFACT_BYTES};

/// Runner backed by the automation service's JSON endpoint.
pub struct HttpRunner {
    client: Client,
    config: AutomationServiceConfig,
}

impl HttpRunner {
    /// Create a new runner with the given configuration.
    pub fn new(config: AutomationServiceConfig) -> Result<Self, RunError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RunError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Full URL of the run endpoint.
    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.url.trim_end_matches('/'),
            self.config.path.trim_start_matches('/')
        )
    }

    async fn send(&self, url: &str, request: &RunRequest) -> Result<Artifact, RunError> {
        let mut builder = self.client.post(url).json(request);
        if let Some(token) = self.config.auth_token.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let diagnostic = response.text().await.unwrap_or_default();
            return Err(RunError::Rejected {
                status: status.as_u16(),
                diagnostic,
            });
        }

        let filename = artifact_filename(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            &self.config.default_filename,
        );

        let declared = response.content_length().unwrap_or(0);
        if declared > MAX_ARTIFACT_BYTES as u64 {
            return Err(too_large(declared));
        }

        let mut bytes = Vec::with_capacity(declared as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_send_error)?;
            if bytes.len() + chunk.len() > MAX_ARTIFACT_BYTES {
                return Err(too_large((bytes.len() + chunk.len()) as u64));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(RunError::InvalidResponse(
                "response body was empty".to_string(),
            ));
        }

        Ok(Artifact::new(filename, bytes))
    }
}

fn too_large(len: u64) -> RunError {
    RunError::InvalidResponse(format!(
        "certificate of {} bytes exceeds the {} byte limit",
        len, MAX_ARTIFACT_BYTES
    ))
}

fn map_send_error(e: reqwest::Error) -> RunError {
    if e.is_timeout() {
        RunError::Timeout
    } else {
        RunError::Transport(e.to_string())
    }
}

#[async_trait]
impl CertificateRunner for HttpRunner {
    fn name(&self) -> &str {
        "http"
    }

    async fn run(&self, request: &RunRequest) -> Result<Artifact, RunError> {
        let url = self.endpoint();
        let start = Instant::now();

        debug!(url = %url, "Submitting run request to automation service");

        let outcome = self.send(&url, request).await;

        let elapsed = start.elapsed();
        EXTERNAL_SERVICE_DURATION
            .with_label_values(&["automation", "run"])
            .observe(elapsed.as_secs_f64());

        match &outcome {
            Ok(artifact) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["automation", "run", "success"])
                    .inc();
                debug!(
                    duration_ms = elapsed.as_millis() as u64,
                    filename = %artifact.filename,
                    size_bytes = artifact.len(),
                    "Run exchange complete"
                );
            }
            Err(e) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["automation", "run", "error"])
                    .inc();
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    kind = e.kind(),
                    "Run exchange failed"
                );
            }
        }

        outcome
    }
}
