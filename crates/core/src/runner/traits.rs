//! Certificate runner trait.

use async_trait::async_trait;

use crate::fields::RunRequest;

use super::types::{Artifact, RunError};

/// Drives the third-party portal and returns the certificate.
#[async_trait]
pub trait CertificateRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Submit a validated request and download the resulting artifact.
    async fn run(&self, request: &RunRequest) -> Result<Artifact, RunError>;
}
