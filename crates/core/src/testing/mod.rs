//! Testing utilities and mock implementations.
//!
//! Mock implementations of the extraction and automation service traits,
//! so the workflow and the API can be exercised without either service.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtw_core::testing::{fixtures, MockExtractor, MockRunner};
//!
//! let extractor = MockExtractor::new();
//! let runner = MockRunner::new();
//!
//! extractor.set_result(fixtures::partial_extraction()).await;
//!
//! // Build a Workflow from them...
//! ```

mod mock_extractor;
mod mock_runner;

pub use mock_extractor::{MockExtractor, RecordedExtraction};
pub use mock_runner::MockRunner;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::document::{Document, DocumentRole};
    use crate::extraction::{Confidence, ExtractionResult, ExtractionSource};
    use crate::fields::{FieldEdit, FieldName, FieldSet};

    /// Minimal bytes that sniff as a PDF.
    pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

    /// Minimal bytes that sniff as a PNG.
    pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    /// A share-code confirmation PDF.
    pub fn share_code_document() -> Document {
        Document::new(DocumentRole::ShareCodeDoc, PDF_BYTES.to_vec(), None)
            .with_filename("share_code.pdf")
    }

    /// A date-of-birth document image.
    pub fn dob_document() -> Document {
        Document::new(DocumentRole::DobDoc, PNG_BYTES.to_vec(), Some("image/png"))
            .with_filename("passport.png")
    }

    /// A clean extraction with all fields present.
    pub fn full_extraction() -> ExtractionResult {
        ExtractionResult {
            share_code: "W4K 7PN 2QX".to_string(),
            dob_day: "14".to_string(),
            dob_month: "03".to_string(),
            dob_year: "1992".to_string(),
            confidence: Confidence::new(95, 88),
            source: ExtractionSource {
                share_code: "pdf_text".to_string(),
                dob: "vision".to_string(),
            },
        }
    }

    /// An extraction where the date of birth could not be read.
    pub fn partial_extraction() -> ExtractionResult {
        ExtractionResult {
            dob_day: String::new(),
            dob_month: String::new(),
            dob_year: String::new(),
            confidence: Confidence::new(90, 0),
            ..full_extraction()
        }
    }

    /// An edit that fills every field, company name included.
    pub fn complete_edit() -> FieldEdit {
        FieldEdit::new()
            .with(FieldName::CompanyName, "Acme Ltd")
            .with(FieldName::ShareCode, "W4K 7PN 2QX")
            .with(FieldName::DobDay, "14")
            .with(FieldName::DobMonth, "03")
            .with(FieldName::DobYear, "1992")
    }

    /// A field set that passes validation.
    pub fn complete_fields() -> FieldSet {
        let mut fields = FieldSet::new();
        fields.apply_edit(&complete_edit());
        fields
    }
}
