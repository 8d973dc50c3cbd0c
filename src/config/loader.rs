//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::load_balancer::Algorithm;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Values supplied by flags or environment variables; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backends: Option<Vec<String>>,
    pub port: Option<u16>,
    pub algorithm: Option<String>,
    pub health_interval_secs: Option<u64>,
}

impl Overrides {
    pub fn apply(self, config: &mut BalancerConfig) {
        if let Some(backends) = self.backends {
            config.backends = backends;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(tag) = self.algorithm {
            config.algorithm = Algorithm::from_tag(&tag);
        }
        if let Some(secs) = self.health_interval_secs {
            config.health_check.interval_secs = secs;
        }
    }
}

/// Parse a TOML document into a configuration (without validation).
pub fn from_toml_str(content: &str) -> Result<BalancerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    resolve(Some(path), Overrides::default())
}

/// Merge defaults, an optional file and overrides, then validate.
pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<BalancerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            from_toml_str(&content)?
        }
        None => BalancerConfig::default(),
    };

    overrides.apply(&mut config);
    config.backends = normalize_backends(config.backends);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Trim entries and drop empty ones, keeping order.
pub fn normalize_backends(backends: Vec<String>) -> Vec<String> {
    backends
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}
