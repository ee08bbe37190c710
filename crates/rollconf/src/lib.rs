//! Configuration loading for the Rollcall client.
//!
//! Kept deliberately small so both the client library and the CLI can
//! depend on it. Values layer from config files and the environment, later
//! sources winning:
//!
//! 1. Compiled defaults
//! 2. `/etc/rollcall/config.toml`
//! 3. `~/.config/rollcall/config.toml`
//! 4. `./rollcall.toml` (or the file named on the command line)
//! 5. `ROLLCALL_*` environment variables
//!
//! ```rust,no_run
//! use rollconf::RollConfig;
//!
//! let config = RollConfig::load().expect("Failed to load config");
//! println!("Service: {}", config.server.base_url);
//! println!("Session file: {}", config.paths.session_file.display());
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! base_url = "https://attendance.example.edu"
//! accept_invalid_certs = false
//! timeout_secs = 30
//!
//! [diagnostics]
//! verbose_login = false
//! log_filter = "rollcall=warn"
//!
//! [paths]
//! session_file = "~/.local/share/rollcall/session.json"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{ConfigSources, discover_config_files_with_override, expand_path};
pub use settings::{DiagnosticsConfig, PathsConfig, ServerConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete Rollcall configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RollConfig {
    /// Attendance service endpoint and transport settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging and troubleshooting switches.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Where client state lives on disk.
    #[serde(default)]
    pub paths: PathsConfig,
}

impl RollConfig {
    /// Load configuration from every source, in the crate-level order.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with `config_path` standing in for the local
    /// `./rollcall.toml` override. System and user files still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Like [`RollConfig::load`], also reporting where values came from.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Like [`RollConfig::load_from`], also reporting where values came from.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = RollConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        // Rendered by hand to keep section and key order stable
        let mut output = String::new();

        output.push_str("# Rollcall Configuration\n\n");

        output.push_str("[server]\n");
        output.push_str(&format!("base_url = \"{}\"\n", self.server.base_url));
        output.push_str(&format!(
            "accept_invalid_certs = {}\n",
            self.server.accept_invalid_certs
        ));
        output.push_str(&format!("timeout_secs = {}\n", self.server.timeout_secs));

        output.push_str("\n[diagnostics]\n");
        output.push_str(&format!(
            "verbose_login = {}\n",
            self.diagnostics.verbose_login
        ));
        output.push_str(&format!(
            "log_filter = \"{}\"\n",
            self.diagnostics.log_filter
        ));

        output.push_str("\n[paths]\n");
        output.push_str(&format!(
            "session_file = \"{}\"\n",
            self.paths.session_file.display()
        ));

        output
    }
}
