//! Run coordinator.
//!
//! Submits a validated [`crate::fields::RunRequest`] to the automation
//! service and streams back the certificate. A missing or odd filename hint
//! never fails a run; the default name is used instead.

mod http;
mod traits;
mod types;

pub use http::HttpRunner;
pub use traits::CertificateRunner;
pub use types::*;
