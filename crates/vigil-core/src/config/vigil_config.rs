//! Top-level Vigil configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{IdentityConfig, LineTolerance, PathMode, QueryConfig, StoreConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VIGIL_*`)
/// 2. Project config (`vigil.toml` in project root)
/// 3. User config (`~/.vigil/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    pub identity: IdentityConfig,
    pub store: StoreConfig,
    pub query: QueryConfig,
}

impl VigilConfig {
    /// Load configuration with layered resolution.
    ///
    /// Resolution order (highest priority first):
    /// 1. Environment variables (`VIGIL_*`)
    /// 2. Project config (`vigil.toml` in `root`)
    /// 3. User config (`~/.vigil/config.toml`)
    /// 4. Compiled defaults
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(_) => {
                        // Non-parse errors from user config are warnings, not
                        // fatal. Continue with defaults.
                    }
                }
            }
        }

        // Layer 2: project config
        let project_config_path = root.join("vigil.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 1 (highest priority): environment variables
        Self::apply_env_overrides(&mut config);

        // Validate the final config
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &VigilConfig) -> Result<(), ConfigError> {
        if let Some(components) = config.identity.path_components {
            if components == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "identity.path_components".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(bucket) = config.identity.line_bucket {
            if bucket == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "identity.line_bucket".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(size) = config.store.read_pool_size {
            if size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "store.read_pool_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(size) = config.query.default_page_size {
            if size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "query.default_page_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.vigil/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut VigilConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: VigilConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut VigilConfig, other: &VigilConfig) {
        // Identity
        if !other.identity.strip_prefixes.is_empty() {
            base.identity.strip_prefixes = other.identity.strip_prefixes.clone();
        }
        if other.identity.path_mode.is_some() {
            base.identity.path_mode = other.identity.path_mode;
        }
        if other.identity.path_components.is_some() {
            base.identity.path_components = other.identity.path_components;
        }
        if other.identity.line_tolerance.is_some() {
            base.identity.line_tolerance = other.identity.line_tolerance;
        }
        if other.identity.line_bucket.is_some() {
            base.identity.line_bucket = other.identity.line_bucket;
        }
        if other.identity.include_column.is_some() {
            base.identity.include_column = other.identity.include_column;
        }

        // Store
        if other.store.read_pool_size.is_some() {
            base.store.read_pool_size = other.store.read_pool_size;
        }
        if other.store.busy_retries.is_some() {
            base.store.busy_retries = other.store.busy_retries;
        }
        if other.store.busy_timeout_ms.is_some() {
            base.store.busy_timeout_ms = other.store.busy_timeout_ms;
        }

        // Query
        if other.query.component_cache_capacity.is_some() {
            base.query.component_cache_capacity = other.query.component_cache_capacity;
        }
        if other.query.default_page_size.is_some() {
            base.query.default_page_size = other.query.default_page_size;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `VIGIL_STORE_READ_POOL_SIZE`, `VIGIL_IDENTITY_PATH_MODE`, etc.
    fn apply_env_overrides(config: &mut VigilConfig) {
        if let Ok(val) = std::env::var("VIGIL_IDENTITY_PATH_MODE") {
            if let Some(v) = PathMode::parse(&val) {
                config.identity.path_mode = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_IDENTITY_PATH_COMPONENTS") {
            if let Ok(v) = val.parse::<u32>() {
                config.identity.path_components = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_IDENTITY_LINE_TOLERANCE") {
            if let Some(v) = LineTolerance::parse(&val) {
                config.identity.line_tolerance = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_IDENTITY_LINE_BUCKET") {
            if let Ok(v) = val.parse::<u32>() {
                config.identity.line_bucket = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_IDENTITY_INCLUDE_COLUMN") {
            if let Ok(v) = val.parse::<bool>() {
                config.identity.include_column = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_STORE_READ_POOL_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.store.read_pool_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_STORE_BUSY_RETRIES") {
            if let Ok(v) = val.parse::<u32>() {
                config.store.busy_retries = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_STORE_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.store.busy_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_QUERY_COMPONENT_CACHE_CAPACITY") {
            if let Ok(v) = val.parse::<u64>() {
                config.query.component_cache_capacity = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_QUERY_DEFAULT_PAGE_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.query.default_page_size = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level vigil config directory: `~/.vigil/`.
fn dirs_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".vigil"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
