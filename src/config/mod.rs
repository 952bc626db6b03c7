//! Configuration system for wxport.
//!
//! Settings are read from `~/.config/wxport/config.toml`. Every field has a
//! default, so a missing or partial file is fine. Command-line flags override
//! whatever is loaded here.
//!
//! # Example
//!
//! ```
//! use wxport::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.log_level, "warn");
//! assert!(!config.pretty);
//!
//! let custom = Config {
//!     pretty: true,
//!     ..Config::default()
//! };
//! assert!(custom.pretty);
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the wxport command.
///
/// # Fields
///
/// * `log_level` - Tracing filter used when `RUST_LOG` is unset (default: "warn")
/// * `pretty` - Pretty-print JSON output (default: false)
/// * `schema` - Schema file used when `--schema` is not given (default: none)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,

    /// Default schema file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pretty: false,
            schema: None,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/wxport/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("wxport");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_if_exists(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_if_exists(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from `path`.
    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }
}
