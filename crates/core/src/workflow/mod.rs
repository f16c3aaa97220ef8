//! Workflow state machine.
//!
//! Sequences intake, extraction, operator review and the certificate run
//! for one operator session:
//!
//! ```text
//! Idle -> Extracting -> AwaitingReview -> Submitting -> Complete
//!             |                               |
//!             +--> Failed(extracting)         +--> Failed(submitting)
//! ```

mod machine;
mod types;

pub use machine::Workflow;
pub use types::*;
