//! Document intake.
//!
//! Accepts the two uploads and checks they are present before anything is
//! sent to the extraction service. Type and size checks are left to the
//! service; their failures surface as extraction errors.

mod types;

pub use types::*;

use tracing::debug;

use crate::fields::ValidationError;

/// Validate that both documents were supplied, each in its own slot.
///
/// An empty payload counts as absent.
pub fn submit_documents(
    share_code: Option<Document>,
    dob: Option<Document>,
) -> Result<DocumentPair, ValidationError> {
    let share_code = in_slot(share_code, DocumentRole::ShareCodeDoc)?;
    let dob = in_slot(dob, DocumentRole::DobDoc)?;

    debug!(
        share_code_len = share_code.len(),
        share_code_type = %share_code.media_type(),
        dob_len = dob.len(),
        dob_type = %dob.media_type(),
        "Documents accepted for extraction"
    );

    Ok(DocumentPair::new(share_code, dob))
}

fn in_slot(document: Option<Document>, slot: DocumentRole) -> Result<Document, ValidationError> {
    let document = document
        .filter(|d| !d.is_empty())
        .ok_or(ValidationError::MissingDocument(slot))?;
    if document.role() != slot {
        return Err(ValidationError::MisplacedDocument {
            slot,
            found: document.role(),
        });
    }
    Ok(document)
}
