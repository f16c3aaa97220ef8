use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Collaborator URLs are http(s)
/// - Timeouts are non-zero
/// - Default artifact filename is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    check_url("extraction.url", &config.extraction.url)?;
    check_url("automation.url", &config.automation.url)?;

    if config.extraction.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "extraction.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.automation.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "automation.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.workflow.extract_timeout_secs == 0 || config.workflow.run_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "workflow stage timeouts cannot be 0".to_string(),
        ));
    }

    if config.automation.default_filename.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "automation.default_filename cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn check_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https:// (got {:?})",
            key, url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[extraction]
url = "http://localhost:8000"

[automation]
url = "https://runner.example.com"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_bad_scheme_fails() {
        let mut config = valid_config();
        config.extraction.url = "localhost:8000".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("extraction.url"));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.automation.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.workflow.run_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_default_filename_fails() {
        let mut config = valid_config();
        config.automation.default_filename = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
