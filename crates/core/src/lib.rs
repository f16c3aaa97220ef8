pub mod config;
pub mod document;
pub mod extraction;
pub mod fields;
pub mod metrics;
pub mod runner;
pub mod testing;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, AutomationServiceConfig, Config,
    ConfigError, ExtractionServiceConfig, SanitizedConfig, SanitizedServiceConfig, ServerConfig,
    WorkflowConfig,
};
pub use document::{submit_documents, Document, DocumentPair, DocumentRole};
pub use extraction::{
    Confidence, ConfidenceLevel, ExtractionError, ExtractionResult, ExtractionSource, Extractor,
    HttpExtractor,
};
pub use fields::{validate_for_run, FieldEdit, FieldName, FieldSet, RunRequest, ValidationError};
pub use runner::{
    Artifact, CertificateRunner, HttpRunner, RunError, DEFAULT_ARTIFACT_NAME, MAX_ARTIFACT_BYTES,
};
pub use workflow::{
    ConfidenceIndicator, ConfidenceIndicators, FailedStage, Workflow, WorkflowError,
    WorkflowSnapshot, WorkflowStage,
};
