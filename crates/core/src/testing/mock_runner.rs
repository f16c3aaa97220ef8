//! Mock certificate runner for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fields::RunRequest;
use crate::runner::{Artifact, CertificateRunner, RunError, DEFAULT_ARTIFACT_NAME};

/// Mock implementation of the CertificateRunner trait.
///
/// Records every request it receives so tests can assert that a run was,
/// or was not, sent.
#[derive(Debug)]
pub struct MockRunner {
    /// Recorded run requests.
    requests: Arc<RwLock<Vec<RunRequest>>>,
    /// Artifact returned on success.
    artifact: Arc<RwLock<Artifact>>,
    /// If set, the next run will fail with this error.
    next_error: Arc<RwLock<Option<RunError>>>,
    /// Simulated service latency.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner returning a small PDF named `RTW-Check.pdf`.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            artifact: Arc::new(RwLock::new(Artifact::new(
                DEFAULT_ARTIFACT_NAME,
                b"%PDF-1.4\n% mock certificate\n%%EOF\n".to_vec(),
            ))),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded run requests.
    pub async fn recorded_requests(&self) -> Vec<RunRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of runs attempted.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Set the artifact returned by subsequent successful runs.
    pub async fn set_artifact(&self, artifact: Artifact) {
        *self.artifact.write().await = artifact;
    }

    /// Configure the next run to fail with the given error.
    pub async fn set_next_error(&self, error: RunError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl CertificateRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, request: &RunRequest) -> Result<Artifact, RunError> {
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.artifact.read().await.clone())
    }
}
