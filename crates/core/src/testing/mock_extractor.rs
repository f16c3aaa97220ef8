//! Mock extractor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::document::{DocumentPair, DocumentRole};
use crate::extraction::{ExtractionError, ExtractionResult, Extractor};

use super::fixtures;

/// A recorded extraction request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExtraction {
    /// Media type of the share-code upload.
    pub share_code_media_type: String,
    /// Media type of the date-of-birth upload.
    pub dob_media_type: String,
    /// Payload sizes in bytes, by role.
    pub sizes: Vec<(DocumentRole, usize)>,
}

/// Mock implementation of the Extractor trait.
///
/// Provides controllable behavior for testing:
/// - Track extraction requests for assertions
/// - Simulate failures and slow responses
/// - Control the returned fields and confidence
///
/// # Example
///
/// ```rust,ignore
/// use rtw_core::testing::MockExtractor;
///
/// let extractor = MockExtractor::new();
/// extractor.set_next_error(ExtractionError::Rejected {
///     status: 503,
///     diagnostic: "model unavailable".to_string(),
/// }).await;
/// ```
#[derive(Debug)]
pub struct MockExtractor {
    /// Recorded extraction requests.
    calls: Arc<RwLock<Vec<RecordedExtraction>>>,
    /// Result returned on success.
    result: Arc<RwLock<ExtractionResult>>,
    /// If set, the next extraction will fail with this error.
    next_error: Arc<RwLock<Option<ExtractionError>>>,
    /// Simulated service latency.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Create a new mock extractor returning [`fixtures::full_extraction`].
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            result: Arc::new(RwLock::new(fixtures::full_extraction())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded extraction requests.
    pub async fn recorded_calls(&self) -> Vec<RecordedExtraction> {
        self.calls.read().await.clone()
    }

    /// Get the number of extractions attempted.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Set the result returned by subsequent successful extractions.
    pub async fn set_result(&self, result: ExtractionResult) {
        *self.result.write().await = result;
    }

    /// Configure the next extraction to fail with the given error.
    pub async fn set_next_error(&self, error: ExtractionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Set the simulated latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, documents: DocumentPair) -> Result<ExtractionResult, ExtractionError> {
        self.calls.write().await.push(RecordedExtraction {
            share_code_media_type: documents.share_code().media_type().to_string(),
            dob_media_type: documents.dob().media_type().to_string(),
            sizes: vec![
                (DocumentRole::ShareCodeDoc, documents.share_code().len()),
                (DocumentRole::DobDoc, documents.dob().len()),
            ],
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.result.read().await.clone())
    }
}
