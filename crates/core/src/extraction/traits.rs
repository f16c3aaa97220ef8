//! Extractor trait.

use async_trait::async_trait;

use crate::document::DocumentPair;

use super::types::{ExtractionError, ExtractionResult};

/// Turns the two uploaded documents into identity fields with confidence.
///
/// Both documents go out in a single exchange so the two confidence scores
/// come from one correlated invocation.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Extract fields from both documents. Consumes the documents.
    async fn extract(&self, documents: DocumentPair) -> Result<ExtractionResult, ExtractionError>;
}
