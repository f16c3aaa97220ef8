//! Workflow state machine.
//!
//! Sole owner of the stage and the field set. The stage doubles as the
//! mutual-exclusion mechanism: the lock is only held while checking and
//! committing a transition, never across a remote exchange, so a second
//! operation arriving mid-flight is rejected instead of queued. An exchange
//! whose caller goes away (client disconnect, collaborator panic) still ends
//! in `Failed`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::document::{submit_documents, Document};
use crate::extraction::{ExtractionError, ExtractionResult, Extractor};
use crate::fields::{validate_for_run, FieldEdit, FieldSet, ValidationError};
use crate::metrics::{
    EXTRACTIONS_TOTAL, EXTRACTION_DURATION, FIELD_CONFIDENCE, RUNS_TOTAL, RUN_DURATION,
    STAGE_TRANSITIONS, VALIDATION_FAILURES,
};
use crate::runner::{Artifact, CertificateRunner, RunError};

use super::types::{
    ConfidenceIndicators, FailedStage, WorkflowError, WorkflowSnapshot, WorkflowStage,
};

const IDLE_EXTRACT_STATUS: &str = "Upload both documents, then extract.";
const EXTRACTION_GUIDANCE: &str =
    "Scanned or low-quality documents may need the extraction backend configured for vision models.";
const RUN_GUIDANCE: &str = "The portal's interface may have changed; check the automation service.";
const CANCELLED_REASON: &str = "cancelled";

struct WorkflowState {
    stage: WorkflowStage,
    fields: FieldSet,
    run_id: Option<Uuid>,
    extract_status: String,
    run_status: String,
    updated_at: DateTime<Utc>,
}

impl WorkflowState {
    fn new() -> Self {
        Self {
            stage: WorkflowStage::Idle,
            fields: FieldSet::new(),
            run_id: None,
            extract_status: IDLE_EXTRACT_STATUS.to_string(),
            run_status: String::new(),
            updated_at: Utc::now(),
        }
    }

    fn transition(&mut self, to: WorkflowStage) {
        let from = std::mem::replace(&mut self.stage, to);
        STAGE_TRANSITIONS
            .with_label_values(&[from.name(), self.stage.name()])
            .inc();
        info!(
            from = from.name(),
            to = self.stage.name(),
            run_id = ?self.run_id,
            "Workflow stage transition"
        );
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Fail an exchange that will never commit. No-op if the workflow has
    /// already moved past it.
    fn abandon(&mut self, run_id: Uuid, stage: FailedStage) {
        let in_flight = match stage {
            FailedStage::Extracting => WorkflowStage::Extracting,
            FailedStage::Submitting => WorkflowStage::Submitting,
        };
        if self.run_id != Some(run_id) || self.stage != in_flight {
            return;
        }

        match stage {
            FailedStage::Extracting => {
                EXTRACTIONS_TOTAL.with_label_values(&["cancelled"]).inc();
                self.extract_status = format!("Extraction {}. Extract again.", CANCELLED_REASON);
            }
            FailedStage::Submitting => {
                RUNS_TOTAL.with_label_values(&["cancelled"]).inc();
                self.run_status = format!("Run {}. Run again.", CANCELLED_REASON);
            }
        }
        warn!(run_id = %run_id, stage = stage.as_str(), "Exchange dropped before completion");
        self.transition(WorkflowStage::Failed {
            stage,
            reason: CANCELLED_REASON.to_string(),
        });
    }

    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            stage: self.stage.clone(),
            run_id: self.run_id,
            fields: self.fields.clone(),
            indicators: ConfidenceIndicators::from(&self.fields),
            extract_status: self.extract_status.clone(),
            run_status: self.run_status.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Held while a remote exchange is in flight. Dropped without [`disarm`]
/// it fails the busy stage, so a cancelled operation never leaves the
/// workflow stuck.
///
/// [`disarm`]: InFlight::disarm
struct InFlight {
    state: Arc<RwLock<WorkflowState>>,
    run_id: Uuid,
    stage: FailedStage,
    armed: bool,
}

impl InFlight {
    fn new(state: &Arc<RwLock<WorkflowState>>, run_id: Uuid, stage: FailedStage) -> Self {
        Self {
            state: Arc::clone(state),
            run_id,
            stage,
            armed: true,
        }
    }

    /// The outcome has been committed.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let (run_id, stage) = (self.run_id, self.stage);
        if let Ok(mut state) = self.state.try_write() {
            state.abandon(run_id, stage);
            return;
        }

        // Readers hold the lock; finish on the runtime instead.
        let state = Arc::clone(&self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.write().await.abandon(run_id, stage);
                });
            }
            Err(_) => {
                error!(run_id = %run_id, "Exchange dropped outside a runtime; stage left busy");
            }
        }
    }
}

/// One operator session: extract, review, run.
pub struct Workflow {
    extractor: Arc<dyn Extractor>,
    runner: Arc<dyn CertificateRunner>,
    config: WorkflowConfig,
    state: Arc<RwLock<WorkflowState>>,
}

impl Workflow {
    /// Create a workflow in the `Idle` stage with an empty field set.
    pub fn new(
        extractor: Arc<dyn Extractor>,
        runner: Arc<dyn CertificateRunner>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            extractor,
            runner,
            config,
            state: Arc::new(RwLock::new(WorkflowState::new())),
        }
    }

    /// Consistent view of stage, fields and status texts.
    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.state.read().await.snapshot()
    }

    /// Current stage.
    pub async fn stage(&self) -> WorkflowStage {
        self.state.read().await.stage.clone()
    }

    /// Copy of the current field set.
    pub async fn fields(&self) -> FieldSet {
        self.state.read().await.fields.clone()
    }

    /// Intake and extraction (the `Extract` action).
    ///
    /// On success the extraction-sourced fields, confidence and source are
    /// replaced in one step and the stage becomes `AwaitingReview`. On
    /// failure the field set is left exactly as it was.
    pub async fn extract(
        &self,
        share_code_doc: Option<Document>,
        dob_doc: Option<Document>,
    ) -> Result<ExtractionResult, WorkflowError> {
        let (run_id, documents) = {
            let mut state = self.state.write().await;
            if !state.stage.can_extract() {
                warn!(stage = state.stage.name(), "Extraction rejected: workflow busy");
                return Err(WorkflowError::invalid_stage("extract", &state.stage));
            }

            let documents = match submit_documents(share_code_doc, dob_doc) {
                Ok(documents) => documents,
                Err(e) => {
                    record_validation_failure(&e);
                    state.extract_status = e.to_string();
                    state.touch();
                    return Err(e.into());
                }
            };

            let run_id = Uuid::new_v4();
            state.run_id = Some(run_id);
            state.extract_status = "Extracting fields from documents...".to_string();
            state.transition(WorkflowStage::Extracting);

            (run_id, documents)
        };
        let mut in_flight = InFlight::new(&self.state, run_id, FailedStage::Extracting);

        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.extract_timeout_secs);
        let outcome = match tokio::time::timeout(timeout, self.extractor.extract(documents)).await
        {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Timeout),
        };
        let elapsed = start.elapsed();

        let mut state = self.state.write().await;
        in_flight.disarm();
        match outcome {
            Ok(result) => {
                let label = if result.is_partial() { "partial" } else { "complete" };
                EXTRACTIONS_TOTAL.with_label_values(&[label]).inc();
                EXTRACTION_DURATION
                    .with_label_values(&[label])
                    .observe(elapsed.as_secs_f64());
                FIELD_CONFIDENCE
                    .with_label_values(&["share_code"])
                    .observe(result.confidence.share_code as f64);
                FIELD_CONFIDENCE
                    .with_label_values(&["dob"])
                    .observe(result.confidence.dob as f64);

                state.fields.apply_extraction(&result);
                state.extract_status = if result.is_partial() {
                    "Extracted with gaps. Fill in the empty fields before running.".to_string()
                } else {
                    "Extracted. Review the fields before running.".to_string()
                };
                state.transition(WorkflowStage::AwaitingReview);

                info!(
                    run_id = %run_id,
                    duration_ms = elapsed.as_millis() as u64,
                    partial = result.is_partial(),
                    share_code_confidence = result.confidence.share_code,
                    dob_confidence = result.confidence.dob,
                    "Extraction complete"
                );
                Ok(result)
            }
            Err(e) => {
                EXTRACTIONS_TOTAL.with_label_values(&["failed"]).inc();
                EXTRACTION_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed.as_secs_f64());

                let reason = e.diagnostic();
                state.extract_status =
                    format!("Extraction failed: {}. {}", reason, EXTRACTION_GUIDANCE);
                state.transition(WorkflowStage::Failed {
                    stage: FailedStage::Extracting,
                    reason,
                });

                warn!(run_id = %run_id, error = %e, "Extraction failed");
                Err(e.into())
            }
        }
    }

    /// Apply an operator edit to the field set.
    pub async fn edit_fields(&self, edit: FieldEdit) -> Result<FieldSet, WorkflowError> {
        let mut state = self.state.write().await;
        if !state.stage.can_edit() {
            warn!(stage = state.stage.name(), "Field edit rejected: workflow busy");
            return Err(WorkflowError::invalid_stage("edit fields", &state.stage));
        }

        state.fields.apply_edit(&edit);
        state.touch();

        debug!(
            edited = ?edit.entries().map(|(f, _)| f.as_str()).collect::<Vec<_>>(),
            "Fields edited"
        );
        Ok(state.fields.clone())
    }

    /// Validate and run (the `RunAndDownload` action).
    ///
    /// The returned artifact is handed over and not retained.
    pub async fn run(&self) -> Result<Artifact, WorkflowError> {
        let (run_id, request) = {
            let mut state = self.state.write().await;
            if !state.stage.can_run() {
                warn!(stage = state.stage.name(), "Run rejected: not awaiting review");
                return Err(WorkflowError::invalid_stage("run", &state.stage));
            }

            let request = match validate_for_run(&state.fields) {
                Ok(request) => request,
                Err(e) => {
                    record_validation_failure(&e);
                    state.run_status = e.to_string();
                    state.touch();
                    return Err(e.into());
                }
            };

            let run_id = Uuid::new_v4();
            state.run_id = Some(run_id);
            state.run_status = "Running check on the portal...".to_string();
            state.transition(WorkflowStage::Submitting);

            (run_id, request)
        };
        let mut in_flight = InFlight::new(&self.state, run_id, FailedStage::Submitting);

        let start = Instant::now();
        let timeout = Duration::from_secs(self.config.run_timeout_secs);
        let outcome = match tokio::time::timeout(timeout, self.runner.run(&request)).await {
            Ok(result) => result,
            Err(_) => Err(RunError::Timeout),
        };
        let elapsed = start.elapsed();

        let mut state = self.state.write().await;
        in_flight.disarm();
        match outcome {
            Ok(artifact) => {
                RUNS_TOTAL.with_label_values(&["success"]).inc();
                RUN_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed.as_secs_f64());

                state.run_status = format!("Downloaded {}.", artifact.filename);
                state.transition(WorkflowStage::Complete);

                info!(
                    run_id = %run_id,
                    duration_ms = elapsed.as_millis() as u64,
                    filename = %artifact.filename,
                    size_bytes = artifact.len(),
                    "Run complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                RUNS_TOTAL.with_label_values(&["failed"]).inc();
                RUN_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed.as_secs_f64());

                let reason = e.diagnostic();
                state.run_status = format!("Run failed: {}. {}", reason, RUN_GUIDANCE);
                state.transition(WorkflowStage::Failed {
                    stage: FailedStage::Submitting,
                    reason,
                });

                warn!(run_id = %run_id, error = %e, "Run failed");
                Err(e.into())
            }
        }
    }

    /// End the session: discard fields and status, return to `Idle`.
    pub async fn reset(&self) -> Result<(), WorkflowError> {
        let mut state = self.state.write().await;
        if state.stage.is_busy() {
            warn!(stage = state.stage.name(), "Reset rejected: workflow busy");
            return Err(WorkflowError::invalid_stage("reset", &state.stage));
        }

        let previous = std::mem::replace(&mut *state, WorkflowState::new());
        STAGE_TRANSITIONS
            .with_label_values(&[previous.stage.name(), "idle"])
            .inc();
        info!(from = previous.stage.name(), "Workflow reset");
        Ok(())
    }
}

fn record_validation_failure(e: &ValidationError) {
    VALIDATION_FAILURES.with_label_values(&[e.reason()]).inc();
    info!(reason = e.reason(), "Validation failed: {}", e);
}
