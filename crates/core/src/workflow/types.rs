//! Types for the workflow state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::extraction::{ConfidenceLevel, ExtractionError};
use crate::fields::{FieldName, FieldSet, ValidationError};
use crate::runner::RunError;

/// Errors returned by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Local validation failed; nothing was sent anywhere.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation is not legal in the current stage.
    #[error("cannot {operation} while {stage}")]
    InvalidStage {
        operation: &'static str,
        stage: String,
    },

    /// The extraction exchange failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The run exchange failed.
    #[error(transparent)]
    Run(#[from] RunError),
}

impl WorkflowError {
    pub(crate) fn invalid_stage(operation: &'static str, stage: &WorkflowStage) -> Self {
        Self::InvalidStage {
            operation,
            stage: stage.name().to_string(),
        }
    }

    /// Whether the error came from a remote collaborator timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            WorkflowError::Extraction(ExtractionError::Timeout)
                | WorkflowError::Run(RunError::Timeout)
        )
    }
}

/// Which remote stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Extracting,
    Submitting,
}

impl FailedStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailedStage::Extracting => "extracting",
            FailedStage::Submitting => "submitting",
        }
    }
}

/// Current stage of the workflow. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowStage {
    Idle,
    Extracting,
    AwaitingReview,
    Submitting,
    Complete,
    Failed { stage: FailedStage, reason: String },
}

impl WorkflowStage {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowStage::Idle => "idle",
            WorkflowStage::Extracting => "extracting",
            WorkflowStage::AwaitingReview => "awaiting_review",
            WorkflowStage::Submitting => "submitting",
            WorkflowStage::Complete => "complete",
            WorkflowStage::Failed { .. } => "failed",
        }
    }

    /// A remote exchange is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowStage::Extracting | WorkflowStage::Submitting)
    }

    /// Extraction may start (or restart) from here.
    pub fn can_extract(&self) -> bool {
        !self.is_busy()
    }

    /// A run may start from here. A run never skips review: after a failed
    /// extraction the operator has to extract again.
    pub fn can_run(&self) -> bool {
        matches!(
            self,
            WorkflowStage::AwaitingReview
                | WorkflowStage::Complete
                | WorkflowStage::Failed {
                    stage: FailedStage::Submitting,
                    ..
                }
        )
    }

    /// The operator may edit fields from here.
    pub fn can_edit(&self) -> bool {
        !self.is_busy()
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStage::Failed { stage, reason } => {
                write!(f, "failed({}, {:?})", stage.as_str(), reason)
            }
            other => f.write_str(other.name()),
        }
    }
}

/// One confidence indicator as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceIndicator {
    pub score: u8,
    pub percent: String,
    pub level: ConfidenceLevel,
}

impl ConfidenceIndicator {
    pub fn new(score: u8, extracted: bool) -> Self {
        Self {
            score,
            percent: format!("{}%", score),
            level: ConfidenceLevel::classify(score, extracted),
        }
    }
}

/// The two confidence indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceIndicators {
    pub share_code: ConfidenceIndicator,
    pub dob: ConfidenceIndicator,
}

impl From<&FieldSet> for ConfidenceIndicators {
    fn from(fields: &FieldSet) -> Self {
        let has = |f: FieldName| !fields.value(f).is_empty();
        Self {
            share_code: ConfidenceIndicator::new(
                fields.confidence.share_code,
                has(FieldName::ShareCode),
            ),
            dob: ConfidenceIndicator::new(
                fields.confidence.dob,
                has(FieldName::DobDay) || has(FieldName::DobMonth) || has(FieldName::DobYear),
            ),
        }
    }
}

/// Point-in-time view of the workflow for the operator surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub stage: WorkflowStage,
    pub run_id: Option<Uuid>,
    pub fields: FieldSet,
    pub indicators: ConfidenceIndicators,
    pub extract_status: String,
    pub run_status: String,
    pub updated_at: DateTime<Utc>,
}
