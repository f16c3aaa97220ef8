//! Types for the extraction exchange.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors from the extraction exchange.
///
/// Diagnostic text is kept verbatim for the operator and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The service answered with a non-success status.
    #[error("extraction service returned HTTP {status}: {diagnostic}")]
    Rejected { status: u16, diagnostic: String },

    /// The request never completed (connection refused, reset, ...).
    #[error("extraction service unreachable: {0}")]
    Transport(String),

    /// The exchange exceeded its time budget.
    #[error("extraction timed out")]
    Timeout,

    /// A success response whose body could not be decoded.
    #[error("invalid extraction response: {0}")]
    InvalidResponse(String),
}

impl ExtractionError {
    /// Operator-facing cause: the raw diagnostic body when there is one.
    pub fn diagnostic(&self) -> String {
        match self {
            ExtractionError::Rejected { diagnostic, status } if diagnostic.trim().is_empty() => {
                format!("HTTP {}", status)
            }
            ExtractionError::Rejected { diagnostic, .. } => diagnostic.clone(),
            ExtractionError::Transport(msg) => msg.clone(),
            ExtractionError::Timeout => "Timeout".to_string(),
            ExtractionError::InvalidResponse(msg) => msg.clone(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Rejected { .. } => "rejected",
            ExtractionError::Transport(_) => "transport",
            ExtractionError::Timeout => "timeout",
            ExtractionError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Confidence per field group, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confidence {
    pub share_code: u8,
    pub dob: u8,
}

impl Confidence {
    /// Build a confidence pair, clamping both scores to 100.
    pub fn new(share_code: u8, dob: u8) -> Self {
        Self {
            share_code: share_code.min(100),
            dob: dob.min(100),
        }
    }
}

/// Coarse reading of a confidence score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Nothing was extracted.
    None,
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Classify a score. `extracted` is false when every field in the group is empty.
    pub fn classify(score: u8, extracted: bool) -> Self {
        match score {
            0 if !extracted => ConfidenceLevel::None,
            80..=u8::MAX => ConfidenceLevel::High,
            50..=79 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }
}

/// How each field group was obtained, as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSource {
    #[serde(default)]
    pub share_code: String,
    #[serde(default)]
    pub dob: String,
}

/// Structured output of one extraction.
///
/// Absent fields are empty strings, never missing: a partial result is a
/// normal outcome for scanned or low-quality documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub share_code: String,
    pub dob_day: String,
    pub dob_month: String,
    pub dob_year: String,
    pub confidence: Confidence,
    pub source: ExtractionSource,
}

impl ExtractionResult {
    /// Whether any identity field came back empty.
    pub fn is_partial(&self) -> bool {
        [&self.share_code, &self.dob_day, &self.dob_month, &self.dob_year]
            .iter()
            .any(|v| v.trim().is_empty())
    }
}

impl From<ExtractionResponse> for ExtractionResult {
    fn from(response: ExtractionResponse) -> Self {
        let confidence = response.confidence.unwrap_or_default();
        let source = response.source.unwrap_or_default();
        Self {
            share_code: response.share_code.trim().to_string(),
            dob_day: response.dob_day.trim().to_string(),
            dob_month: response.dob_month.trim().to_string(),
            dob_year: response.dob_year.trim().to_string(),
            confidence: Confidence {
                share_code: score(confidence.share_code),
                dob: score(confidence.dob),
            },
            source: ExtractionSource {
                share_code: source.share_code,
                dob: source.dob,
            },
        }
    }
}

fn score(raw: Option<f64>) -> u8 {
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

/// Wire shape of a successful extraction response. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub share_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dob_day: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dob_month: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dob_year: String,
    #[serde(default)]
    pub confidence: Option<ConfidenceResponse>,
    #[serde(default)]
    pub source: Option<SourceResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfidenceResponse {
    #[serde(default, deserialize_with = "lenient_score")]
    pub share_code: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub dob: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub share_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dob: String,
}

/// Accept strings, numbers, booleans or null; anything else reads as "".
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Accept numbers or numeric strings.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    })
}
