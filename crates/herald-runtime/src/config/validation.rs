//! Configuration validation utilities.

use herald_core::FinderOptions;

use super::error::{ConfigError, ConfigResult};
use super::schema::{HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_finder_options(&config.finder)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates finder options.
fn validate_finder_options(finder: &FinderOptions) -> ConfigResult<()> {
    if finder.pool_size == 0 {
        return Err(ConfigError::validation(
            "Finder pool size must be greater than 0",
        ));
    }

    // An empty prefix matches every type name and would stop every walk
    // at the subscriber itself.
    if finder.reserved_prefixes.iter().any(|prefix| prefix.is_empty()) {
        return Err(ConfigError::validation(
            "Reserved namespace prefixes cannot be empty",
        ));
    }

    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires `logging.file_path`",
        ));
    }

    if let Some(target) = logging
        .filters
        .keys()
        .find(|target| target.trim().is_empty())
    {
        return Err(ConfigError::validation(format!(
            "Log filter target cannot be empty: {target:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&HeraldConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_pool_size() {
        let mut config = HeraldConfig::default();
        config.finder.pool_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_empty_reserved_prefix() {
        let mut config = HeraldConfig::default();
        config.finder.reserved_prefixes.push(String::new());
        assert!(validate_config(&config).is_err());

        // No prefixes at all is fine: every ancestor gets scanned.
        config.finder.reserved_prefixes.clear();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_output_without_path() {
        let mut config = HeraldConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("herald.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_blank_filter_target() {
        let mut config = HeraldConfig::default();
        config.logging.filters.insert(" ".to_string(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
