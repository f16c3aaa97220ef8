//! HTTP extraction client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{multipart, Client};
use tracing::{debug, warn};

use crate::config::ExtractionServiceConfig;
use crate::document::{Document, DocumentPair, DocumentRole};
use crate::metrics::{EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS};

use super::{ExtractionError, ExtractionResponse, ExtractionResult, Extractor};

/// Extractor backed by the extraction service's multipart endpoint.
pub struct HttpExtractor {
    client: Client,
    config: ExtractionServiceConfig,
}

impl HttpExtractor {
    /// Create a new extractor with the given configuration.
    pub fn new(config: ExtractionServiceConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| {
                ExtractionError::Transport(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Full URL of the extraction endpoint.
    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.url.trim_end_matches('/'),
            self.config.path.trim_start_matches('/')
        )
    }

    fn build_form(documents: DocumentPair) -> Result<multipart::Form, ExtractionError> {
        let (share_code, dob) = documents.into_parts();
        Ok(multipart::Form::new()
            .part(
                DocumentRole::ShareCodeDoc.part_name(),
                Self::build_part(share_code)?,
            )
            .part(DocumentRole::DobDoc.part_name(), Self::build_part(dob)?))
    }

    fn build_part(document: Document) -> Result<multipart::Part, ExtractionError> {
        let filename = document
            .filename()
            .map(str::to_string)
            .unwrap_or_else(|| default_upload_name(&document));
        let media_type = document.media_type().to_string();

        multipart::Part::bytes(document.into_bytes())
            .file_name(filename)
            .mime_str(&media_type)
            .map_err(|e| {
                ExtractionError::Transport(format!("invalid media type {:?}: {}", media_type, e))
            })
    }

    async fn send(
        &self,
        url: &str,
        form: multipart::Form,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut request = self.client.post(url).multipart(form);
        if let Some(token) = self.config.auth_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let diagnostic = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Rejected {
                status: status.as_u16(),
                diagnostic,
            });
        }

        let body = response.bytes().await.map_err(Self::map_send_error)?;
        let decoded: ExtractionResponse = serde_json::from_slice(&body)
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;
        Ok(ExtractionResult::from(decoded))
    }

    fn map_send_error(e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::Timeout
        } else {
            ExtractionError::Transport(e.to_string())
        }
    }
}

/// Upload name derived from role and media type, so services that branch on
/// the file extension (PDF text layer vs. image) still see one.
fn default_upload_name(document: &Document) -> String {
    let ext = match document.media_type() {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        _ => "bin",
    };
    format!("{}.{}", document.role().as_str(), ext)
}

#[async_trait]
impl Extractor for HttpExtractor {
    fn name(&self) -> &str {
        "http"
    }

    async fn extract(&self, documents: DocumentPair) -> Result<ExtractionResult, ExtractionError> {
        let url = self.endpoint();
        let start = Instant::now();
        let form = Self::build_form(documents)?;

        debug!(url = %url, "Sending documents to extraction service");

        let outcome = self.send(&url, form).await;

        let elapsed = start.elapsed();
        EXTERNAL_SERVICE_DURATION
            .with_label_values(&["extraction", "extract"])
            .observe(elapsed.as_secs_f64());

        match &outcome {
            Ok(result) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["extraction", "extract", "success"])
                    .inc();
                debug!(
                    duration_ms = elapsed.as_millis() as u64,
                    partial = result.is_partial(),
                    "Extraction exchange complete"
                );
            }
            Err(e) => {
                EXTERNAL_SERVICE_REQUESTS
                    .with_label_values(&["extraction", "extract", "error"])
                    .inc();
                warn!(
                    duration_ms = elapsed.as_millis() as u64,
                    kind = e.kind(),
                    "Extraction exchange failed"
                );
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, path: &str) -> ExtractionServiceConfig {
        ExtractionServiceConfig {
            url: url.to_string(),
            path: path.to_string(),
            timeout_secs: 5,
            auth_token: None,
        }
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let extractor =
            HttpExtractor::new(config("http://localhost:8000/", "/rtw/extract")).unwrap();
        assert_eq!(extractor.endpoint(), "http://localhost:8000/rtw/extract");

        let extractor = HttpExtractor::new(config("http://localhost:8000", "rtw/extract")).unwrap();
        assert_eq!(extractor.endpoint(), "http://localhost:8000/rtw/extract");
    }

    #[test]
    fn test_default_upload_name() {
        let pdf = Document::new(DocumentRole::ShareCodeDoc, b"%PDF-1.5".to_vec(), None);
        assert_eq!(default_upload_name(&pdf), "share_code_doc.pdf");

        let jpg = Document::new(DocumentRole::DobDoc, vec![0xFF, 0xD8, 0xFF, 0xE1], None);
        assert_eq!(default_upload_name(&jpg), "dob_doc.jpg");

        let unknown = Document::new(DocumentRole::DobDoc, b"????".to_vec(), None);
        assert_eq!(default_upload_name(&unknown), "dob_doc.bin");
    }

    #[test]
    fn test_name() {
        let extractor = HttpExtractor::new(config("http://localhost:8000", "/x")).unwrap();
        assert_eq!(extractor.name(), "http");
    }
}
