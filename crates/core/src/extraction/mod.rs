//! Extraction coordinator.
//!
//! Sends both documents to the extraction service in one multipart exchange
//! and maps the answer into an [`ExtractionResult`]. Partial answers are
//! successes; only a failed exchange is an error.

mod http;
mod traits;
mod types;

pub use http::HttpExtractor;
pub use traits::Extractor;
pub use types::*;
