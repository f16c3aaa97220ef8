//! Field set and run validation.

mod types;

pub use types::*;

use thiserror::Error;

use crate::document::DocumentRole;

/// Local, pre-network validation failures. Never sent to a remote system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required upload was not provided.
    #[error("missing document: {}", .0.label())]
    MissingDocument(DocumentRole),

    /// An upload was passed in the other document's slot.
    #[error("{} supplied as the {}", .found.label(), .slot.label())]
    MisplacedDocument {
        slot: DocumentRole,
        found: DocumentRole,
    },

    /// The company name is blank.
    #[error("company name is required")]
    MissingCompanyName,

    /// Share code or part of the date of birth is blank.
    #[error("share code and full date of birth are required (missing: {})", join(.missing))]
    IncompleteIdentity { missing: Vec<FieldName> },
}

impl ValidationError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingDocument(_) => "missing_document",
            ValidationError::MisplacedDocument { .. } => "misplaced_document",
            ValidationError::MissingCompanyName => "missing_company_name",
            ValidationError::IncompleteIdentity { .. } => "incomplete_identity",
        }
    }
}

fn join(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check the field set and build a run request.
///
/// Pure: no I/O, no state changes.
pub fn validate_for_run(fields: &FieldSet) -> Result<RunRequest, ValidationError> {
    if fields.company_name.trim().is_empty() {
        return Err(ValidationError::MissingCompanyName);
    }

    let missing: Vec<FieldName> = fields
        .missing()
        .into_iter()
        .filter(|f| f.is_extracted())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteIdentity { missing });
    }

    Ok(RunRequest::from_validated(fields))
}
