//! Configuration loader using figment.
//!
//! This module provides a layered configuration loading system:
//!
//! - **Multiple sources**: TOML/YAML files, environment variables, programmatic defaults
//! - **Layered configuration**: Later sources override earlier ones
//! - **Profile support**: Development vs production configurations
//!
//! # Feature Flags
//!
//! - `toml-config`: enables TOML configuration files (`herald.toml`)
//! - `yaml-config`: enables YAML configuration files (`herald.yaml`, `herald.yml`)
//!
//! Both features can be enabled simultaneously; if so, both file formats are searched and loaded.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`herald.{profile}.toml` / `herald.{profile}.yaml`)
//! 3. Main config file (`herald.toml` / `herald.yaml`)
//! 4. Environment variables (`HERALD_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `HERALD_` prefix with `__` as separator:
//!
//! - `HERALD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `HERALD_FINDER__STRICT_VERIFICATION=true` → `finder.strict_verification = true`
//! - `HERALD_FINDER__POOL_SIZE=8` → `finder.pool_size = 8`
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_runtime::config::ConfigLoader;
//!
//! // Simple loading from default locations
//! let config = ConfigLoader::new().load()?;
//!
//! // Load with specific profile
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//!
//! // Load from specific file with env overrides
//! let config = ConfigLoader::new()
//!     .file("./config/herald.toml")
//!     .with_env()
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HeraldConfig;
use super::validation::validate_config;

/// Prefix of the environment variables read by the loader.
const ENV_PREFIX: &str = "HERALD_";

/// Config file names searched per format; empty when the format is disabled.
#[cfg(feature = "toml-config")]
const TOML_FILE_NAMES: &[&str] = &["herald.toml"];
#[cfg(not(feature = "toml-config"))]
const TOML_FILE_NAMES: &[&str] = &[];

#[cfg(feature = "yaml-config")]
const YAML_FILE_NAMES: &[&str] = &["herald.yaml", "herald.yml"];
#[cfg(not(feature = "yaml-config"))]
const YAML_FILE_NAMES: &[&str] = &[];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; unknown names become [`Profile::Custom`].
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `HERALD_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("HERALD_PROFILE")
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("herald.yaml")
///     .with_env()
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds user config directory to search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("herald"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    ///
    /// Merged values take precedence over every other source.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(HeraldConfig {
    ///         finder: FinderOptions { strict_verification: true, ..Default::default() },
    ///         ..Default::default()
    ///     })
    ///     .load()?;
    /// ```
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Merges a single `key.path = value` override, e.g. `("finder.pool_size", 8)`.
    pub fn set<V: serde::Serialize>(mut self, key: &str, value: V) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<HeraldConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: HeraldConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            strict_verification = config.finder.strict_verification,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        // Start with defaults
        let mut figment = Figment::from(Serialized::defaults(HeraldConfig::default()));

        // Load config files
        if let Some(path) = self.config_file.take() {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path));
            }
        } else {
            figment = self.load_config_files(figment)?;
        }

        // Load environment variables
        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["profile"]).split("__"));
        }

        // Programmatic overrides win
        let overrides = std::mem::take(&mut self.overrides);
        Ok(figment.merge(overrides))
    }

    /// Reads a config file into its own figment, dispatching on file extension.
    ///
    /// Returns `None` for extensions not enabled via feature flags.
    fn file_figment(path: &Path) -> Option<Figment> {
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "toml-config")]
            Some("toml") => Some(Figment::from(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            Some("yaml" | "yml") => Some(Figment::from(Yaml::file(path))),
            _ => None,
        }
    }

    /// Merges a single config file into the figment.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let file = Self::file_figment(path).ok_or_else(|| {
            ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: {}",
                path.display()
            ))
        })?;
        Ok(figment.merge(file))
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("herald"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Common search logic for a single file format.
    ///
    /// Iterates `search_paths × base_names`, tries a profile-specific variant first, then the
    /// base file. Returns `(figment, true)` as soon as a base file is found, or
    /// `(figment, false)` if nothing was located.
    fn load_format_files(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
    ) -> ConfigResult<(Figment, bool)> {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                // Profile-specific: e.g. herald.production.toml
                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = Self::merge_config_file(figment, &profile_path)?;
                }

                // Base file
                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = Self::merge_config_file(figment, &base_path)?;
                    return Ok((figment, true));
                }
            }
        }
        Ok((figment, false))
    }

    /// Searches for and loads configuration files from search paths.
    ///
    /// Which file formats are attempted is controlled by the `toml-config` and `yaml-config`
    /// feature flags. Each enabled format is searched independently.
    fn load_config_files(&self, mut figment: Figment) -> ConfigResult<Figment> {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        for base_names in [TOML_FILE_NAMES, YAML_FILE_NAMES] {
            let (merged, ok) = self.load_format_files(figment, &search_paths, base_names)?;
            figment = merged;
            found |= ok;
        }

        if !found {
            warn!(
                search_paths = ?search_paths,
                "No configuration file found, using defaults"
            );
        }
        Ok(figment)
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().load()
}

/// Loads the configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HeraldConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config, HeraldConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!(Profile::parse("prod"), Profile::Production);
        assert_eq!(Profile::parse("Development"), Profile::Development);
        assert_eq!(Profile::parse("staging"), Profile::Custom("staging".into()));

        Jail::expect_with(|jail| {
            jail.set_env("HERALD_PROFILE", "production");
            assert_eq!(Profile::from_env(), Profile::Production);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("HERALD_FINDER__STRICT_VERIFICATION", "true");
            jail.set_env("HERALD_FINDER__POOL_SIZE", "8");
            jail.set_env("HERALD_LOGGING__LEVEL", "debug");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert!(config.finder.strict_verification);
            assert_eq!(config.finder.pool_size, 8);
            assert_eq!(config.logging.level, LogLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_overrides_win_over_env() {
        Jail::expect_with(|jail| {
            jail.set_env("HERALD_FINDER__POOL_SIZE", "8");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .set("finder.pool_size", 2)
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.finder.pool_size, 2);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("HERALD_FINDER__POOL_SIZE", "0");

            let result = ConfigLoader::new().search_path(jail.directory()).load();
            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .without_env()
            .file("/nonexistent/herald.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_file_format() {
        Jail::expect_with(|jail| {
            jail.create_file("herald.ini", "[finder]\npool_size = 2\n")?;

            let result = ConfigLoader::new()
                .file(jail.directory().join("herald.ini"))
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::ParseError(_))));
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_toml_file_and_profile() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "herald.toml",
                r#"
                    [finder]
                    reserved_prefixes = ["std::", "platform::"]

                    [logging]
                    level = "warn"

                    [logging.filters]
                    herald_core = "trace"
                "#,
            )?;
            jail.create_file(
                "herald.production.toml",
                r#"
                    [finder]
                    strict_verification = true
                    pool_size = 16
                "#,
            )?;

            let config = ConfigLoader::new()
                .profile("production")
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert!(config.finder.strict_verification);
            assert_eq!(config.finder.pool_size, 16);
            assert_eq!(config.finder.reserved_prefixes, vec!["std::", "platform::"]);
            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.logging.filters["herald_core"], LogLevel::Trace);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_malformed_file_is_a_parse_error() {
        Jail::expect_with(|jail| {
            jail.create_file("herald.toml", "[logging]\nlevel = \"loud\"\n")?;

            let result = ConfigLoader::new()
                .file(jail.directory().join("herald.toml"))
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::ParseError(_))));
            Ok(())
        });
    }
}
