//! Document types for intake.

use serde::{Deserialize, Serialize};

/// Fallback media type when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Which slot of the workflow a document fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    /// Document proving the right-to-work share code.
    ShareCodeDoc,
    /// Passport or background-check document carrying the date of birth.
    DobDoc,
}

impl DocumentRole {
    /// Multipart part name used by the extraction exchange.
    pub fn part_name(&self) -> &'static str {
        match self {
            DocumentRole::ShareCodeDoc => "share_file",
            DocumentRole::DobDoc => "dob_file",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::ShareCodeDoc => "share_code_doc",
            DocumentRole::DobDoc => "dob_doc",
        }
    }

    /// Human-readable label for operator messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentRole::ShareCodeDoc => "share code document",
            DocumentRole::DobDoc => "date of birth document",
        }
    }
}

impl std::fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document: opaque bytes plus declared media type.
///
/// Immutable once built. Consumed by the extraction exchange and never
/// retained by the workflow afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    role: DocumentRole,
    bytes: Vec<u8>,
    media_type: String,
    filename: Option<String>,
}

impl Document {
    /// Build a document. A missing or generic media type is replaced by a
    /// sniffed one when the magic bytes are recognised.
    pub fn new(role: DocumentRole, bytes: Vec<u8>, media_type: Option<&str>) -> Self {
        let declared = media_type
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != OCTET_STREAM);
        let media_type = match declared {
            Some(m) => m.to_string(),
            None => sniff_media_type(&bytes).unwrap_or(OCTET_STREAM).to_string(),
        };

        Self {
            role,
            bytes,
            media_type,
            filename: None,
        }
    }

    /// Attach the original upload filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        if !filename.trim().is_empty() {
            self.filename = Some(filename);
        }
        self
    }

    pub fn role(&self) -> DocumentRole {
        self.role
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Bytes are deliberately left out: documents carry personal data.
impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("role", &self.role)
            .field("media_type", &self.media_type)
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Both documents, validated as present and in their own slots. The only
/// input the extractor accepts; built by [`super::submit_documents`].
#[derive(Debug, Clone)]
pub struct DocumentPair {
    share_code: Document,
    dob: Document,
}

impl DocumentPair {
    pub(crate) fn new(share_code: Document, dob: Document) -> Self {
        Self { share_code, dob }
    }

    pub fn share_code(&self) -> &Document {
        &self.share_code
    }

    pub fn dob(&self) -> &Document {
        &self.dob
    }

    /// Split into `(share_code, dob)`.
    pub fn into_parts(self) -> (Document, Document) {
        (self.share_code, self.dob)
    }
}

/// Guess a media type from leading magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    if bytes.starts_with(b"%PDF") {
        Some("application/pdf")
    } else if bytes.starts_with(PNG) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_media_type() {
        assert_eq!(sniff_media_type(b"%PDF-1.7\n..."), Some("application/pdf"));
        assert_eq!(
            sniff_media_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some("image/png")
        );
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_media_type(b"GIF89a"), None);
        assert_eq!(sniff_media_type(b""), None);
    }

    #[test]
    fn test_declared_media_type_wins() {
        let doc = Document::new(DocumentRole::DobDoc, b"%PDF-1.4".to_vec(), Some("image/png"));
        assert_eq!(doc.media_type(), "image/png");
    }

    #[test]
    fn test_octet_stream_is_sniffed() {
        let doc = Document::new(
            DocumentRole::ShareCodeDoc,
            b"%PDF-1.4".to_vec(),
            Some("application/octet-stream"),
        );
        assert_eq!(doc.media_type(), "application/pdf");

        let doc = Document::new(DocumentRole::ShareCodeDoc, b"plain".to_vec(), None);
        assert_eq!(doc.media_type(), OCTET_STREAM);
    }

    #[test]
    fn test_debug_does_not_print_bytes() {
        let doc = Document::new(DocumentRole::DobDoc, b"SECRET-CONTENT".to_vec(), None)
            .with_filename("passport.jpg");
        let debug = format!("{:?}", doc);
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("passport.jpg"));
        assert!(debug.contains("len: 14"));
    }

    #[test]
    fn test_role_part_names() {
        assert_eq!(DocumentRole::ShareCodeDoc.part_name(), "share_file");
        assert_eq!(DocumentRole::DobDoc.part_name(), "dob_file");
        assert_eq!(DocumentRole::DobDoc.to_string(), "dob_doc");
    }

    #[test]
    fn test_blank_filename_ignored() {
        let doc = Document::new(DocumentRole::DobDoc, vec![1], None).with_filename("  ");
        assert!(doc.filename().is_none());
    }
}
