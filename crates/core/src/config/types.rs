use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::runner::DEFAULT_ARTIFACT_NAME;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub extraction: ExtractionServiceConfig,
    pub automation: AutomationServiceConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Extraction service (OCR / vision model) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionServiceConfig {
    /// Base URL of the extraction service (e.g., "http://localhost:8000")
    pub url: String,
    /// Endpoint path receiving the multipart upload
    #[serde(default = "default_extraction_path")]
    pub path: String,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_extraction_timeout")]
    pub timeout_secs: u32,
    /// Optional bearer token
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_extraction_path() -> String {
    "/rtw/extract".to_string()
}

fn default_extraction_timeout() -> u32 {
    120
}

/// Automation service (portal runner) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutomationServiceConfig {
    /// Base URL of the automation service
    pub url: String,
    /// Endpoint path receiving the run request
    #[serde(default = "default_automation_path")]
    pub path: String,
    /// Request timeout in seconds (default: 300)
    ///
    /// The portal session involves several page loads and a download,
    /// so this is deliberately longer than the extraction timeout.
    #[serde(default = "default_automation_timeout")]
    pub timeout_secs: u32,
    /// Optional bearer token
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Filename used when the response carries no usable filename hint
    #[serde(default = "default_filename")]
    pub default_filename: String,
}

fn default_automation_path() -> String {
    "/rtw/run".to_string()
}

fn default_automation_timeout() -> u32 {
    300
}

fn default_filename() -> String {
    DEFAULT_ARTIFACT_NAME.to_string()
}

/// Stage timeouts enforced by the workflow around each collaborator call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_extract_stage_timeout")]
    pub extract_timeout_secs: u64,
    #[serde(default = "default_run_stage_timeout")]
    pub run_timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            extract_timeout_secs: default_extract_stage_timeout(),
            run_timeout_secs: default_run_stage_timeout(),
        }
    }
}

fn default_extract_stage_timeout() -> u64 {
    180
}

fn default_run_stage_timeout() -> u64 {
    360
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub extraction: SanitizedServiceConfig,
    pub automation: SanitizedServiceConfig,
    pub workflow: WorkflowConfig,
}

/// Sanitized collaborator config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServiceConfig {
    pub url: String,
    pub path: String,
    pub timeout_secs: u32,
    pub auth_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            extraction: SanitizedServiceConfig {
                url: config.extraction.url.clone(),
                path: config.extraction.path.clone(),
                timeout_secs: config.extraction.timeout_secs,
                auth_token_configured: token_configured(&config.extraction.auth_token),
            },
            automation: SanitizedServiceConfig {
                url: config.automation.url.clone(),
                path: config.automation.path.clone(),
                timeout_secs: config.automation.timeout_secs,
                auth_token_configured: token_configured(&config.automation.auth_token),
            },
            workflow: config.workflow.clone(),
        }
    }
}

fn token_configured(token: &Option<String>) -> bool {
    token.as_deref().is_some_and(|t| !t.trim().is_empty())
}
