//! Types for the run exchange.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;
use thiserror::Error;

/// Artifact name used when the response carries no usable filename hint.
pub const DEFAULT_ARTIFACT_NAME: &str = "RTW-Check.pdf";

/// Upper bound on a downloaded certificate.
pub const MAX_ARTIFACT_BYTES: usize = 32 * 1024 * 1024;

/// Media type of the certificate.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Errors from the run exchange.
///
/// There is no partial-artifact state: either the whole body arrived or the
/// run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The service answered with a non-success status.
    #[error("automation service returned HTTP {status}: {diagnostic}")]
    Rejected { status: u16, diagnostic: String },

    /// The request never completed, or the body stream broke.
    #[error("automation service unreachable: {0}")]
    Transport(String),

    /// The exchange exceeded its time budget.
    #[error("run timed out")]
    Timeout,

    /// A success response that carried no certificate.
    #[error("invalid run response: {0}")]
    InvalidResponse(String),
}

impl RunError {
    /// Operator-facing cause: the raw diagnostic body when there is one.
    pub fn diagnostic(&self) -> String {
        match self {
            RunError::Rejected { diagnostic, status } if diagnostic.trim().is_empty() => {
                format!("HTTP {}", status)
            }
            RunError::Rejected { diagnostic, .. } => diagnostic.clone(),
            RunError::Transport(msg) => msg.clone(),
            RunError::Timeout => "Timeout".to_string(),
            RunError::InvalidResponse(msg) => msg.clone(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Rejected { .. } => "rejected",
            RunError::Transport(_) => "transport",
            RunError::Timeout => "timeout",
            RunError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// The downloaded certificate, ready to hand to the operator.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_MEDIA_TYPE.to_string(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|[;\s])filename\s*=\s*"?([^";]*)"?"#).unwrap());

/// Pull the filename out of a `Content-Disposition`-style header value.
///
/// Accepts `filename="x.pdf"` and `filename=x.pdf`. Directory components are
/// stripped. Returns `None` when the hint is absent, malformed or blank; the
/// caller then falls back to [`DEFAULT_ARTIFACT_NAME`].
pub fn parse_filename_hint(header_value: &str) -> Option<String> {
    let captured = FILENAME_RE.captures(header_value)?.get(1)?.as_str();
    let basename = captured
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if basename.is_empty() || basename == "." || basename == ".." {
        None
    } else {
        Some(basename.to_string())
    }
}

/// Resolve the artifact name from an optional header value.
pub fn artifact_filename(header_value: Option<&str>, default_name: &str) -> String {
    header_value
        .and_then(parse_filename_hint)
        .unwrap_or_else(|| default_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            parse_filename_hint(r#"attachment; filename="RTW-Check-2024.pdf""#).as_deref(),
            Some("RTW-Check-2024.pdf")
        );
    }

    #[test]
    fn test_unquoted_filename() {
        assert_eq!(
            parse_filename_hint("attachment; filename=check.pdf").as_deref(),
            Some("check.pdf")
        );
        assert_eq!(
            parse_filename_hint("filename=check.pdf; size=10").as_deref(),
            Some("check.pdf")
        );
    }

    #[test]
    fn test_bare_quoted_filename() {
        assert_eq!(
            parse_filename_hint(r#"filename="RTW-Check-2024.pdf""#).as_deref(),
            Some("RTW-Check-2024.pdf")
        );
    }

    #[test]
    fn test_case_insensitive_key() {
        assert_eq!(
            parse_filename_hint(r#"Attachment; FileName="a.pdf""#).as_deref(),
            Some("a.pdf")
        );
    }

    #[test]
    fn test_missing_or_malformed() {
        assert_eq!(parse_filename_hint(""), None);
        assert_eq!(parse_filename_hint("attachment"), None);
        assert_eq!(parse_filename_hint(r#"attachment; filename="""#), None);
        assert_eq!(parse_filename_hint("attachment; filename=   "), None);
        assert_eq!(parse_filename_hint("attachment; myfilename=x.pdf"), None);
    }

    #[test]
    fn test_directory_components_stripped() {
        assert_eq!(
            parse_filename_hint(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(
            parse_filename_hint(r#"attachment; filename="C:\tmp\out.pdf""#).as_deref(),
            Some("out.pdf")
        );
        assert_eq!(parse_filename_hint(r#"attachment; filename="dir/""#), None);
        assert_eq!(parse_filename_hint(r#"attachment; filename="..""#), None);
    }

    #[test]
    fn test_artifact_filename_fallback() {
        assert_eq!(artifact_filename(None, DEFAULT_ARTIFACT_NAME), "RTW-Check.pdf");
        assert_eq!(
            artifact_filename(Some("inline"), DEFAULT_ARTIFACT_NAME),
            "RTW-Check.pdf"
        );
        assert_eq!(
            artifact_filename(Some(r#"attachment; filename="RTW-Check-2024.pdf""#), "x.pdf"),
            "RTW-Check-2024.pdf"
        );
    }

    #[test]
    fn test_artifact_debug_hides_bytes() {
        let artifact = Artifact::new("a.pdf", b"%PDF-secret".to_vec());
        let debug = format!("{:?}", artifact);
        assert!(debug.contains("a.pdf"));
        assert!(!debug.contains("secret"));
        assert_eq!(artifact.content_type, "application/pdf");
    }

    #[test]
    fn test_run_error_diagnostic() {
        let err = RunError::Rejected {
            status: 500,
            diagnostic: "Continue button not found".to_string(),
        };
        assert_eq!(err.diagnostic(), "Continue button not found");
        assert_eq!(err.kind(), "rejected");
        assert_eq!(RunError::Timeout.diagnostic(), "Timeout");
    }
}
