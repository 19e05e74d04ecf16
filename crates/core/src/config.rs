//! Configuration management for s3seed

use crate::error::{Error, Result};
use dirs::home_dir;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the pair list
pub const PAIRS_ENV_VAR: &str = "S3_COPY_PAIRS";

/// Configuration directory name
const CONFIG_DIR: &str = "s3seed";

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub copy: CopyConfig,
    #[serde(default)]
    pub client: ClientConfig,
    pub logging: Option<LoggingConfig>,
}

/// Pairs to copy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyConfig {
    #[serde(default)]
    pub pairs: Vec<String>,
    #[serde(default)]
    pub dry_run: bool,
}

/// Object-store client settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_aws_bin")]
    pub aws_bin: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            aws_bin: default_aws_bin(),
            endpoint_url: None,
            region: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Which transfer engine carries out remote operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// External `aws` command-line client
    #[default]
    Cli,
    /// Native AWS SDK
    Sdk,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cli" => Ok(Backend::Cli),
            "sdk" => Ok(Backend::Sdk),
            other => Err(Error::InvalidInput(format!(
                "Unknown backend '{}' (expected 'cli' or 'sdk')",
                other
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Cli => write!(f, "cli"),
            Backend::Sdk => write!(f, "sdk"),
        }
    }
}

// Default values
fn default_aws_bin() -> String {
    "aws".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Default configuration file path (`~/.config/s3seed/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    Ok(config)
}

/// Load the explicit file, or the default one when it exists
pub fn load_optional_config(explicit: Option<&Path>) -> Result<Option<ConfigFile>> {
    match explicit {
        Some(path) => load_config(path).map(Some),
        None => match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading default configuration");
                load_config(&path).map(Some)
            }
            _ => Ok(None),
        },
    }
}

/// Resolved, immutable settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub pairs: String,
    pub dry_run: bool,
    pub verbose: bool,
    pub client: ClientConfig,
}

/// Command-line overrides applied on top of the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub pairs: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub backend: Option<Backend>,
    pub aws_bin: Option<String>,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl RunConfig {
    /// Merge overrides with the optional file.
    ///
    /// The pair list from the overrides (flag or environment) wins over the
    /// file. An empty result is [`Error::ConfigMissing`].
    pub fn resolve(overrides: Overrides, file: Option<ConfigFile>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let pairs = overrides
            .pairs
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| file.copy.pairs.join(","));
        if pairs.trim().is_empty() {
            return Err(Error::ConfigMissing(format!(
                "{} is not set and no pairs are configured",
                PAIRS_ENV_VAR
            )));
        }

        let mut client = file.client;
        if let Some(backend) = overrides.backend {
            client.backend = backend;
        }
        if let Some(aws_bin) = overrides.aws_bin {
            client.aws_bin = aws_bin;
        }
        if overrides.endpoint_url.is_some() {
            client.endpoint_url = overrides.endpoint_url;
        }
        if overrides.region.is_some() {
            client.region = overrides.region;
        }

        Ok(Self {
            pairs,
            dry_run: overrides.dry_run || file.copy.dry_run,
            verbose: overrides.verbose,
            client,
        })
    }
}
