//! Configuration sections for the Rollcall client.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Attendance service endpoint and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the attendance service.
    /// Default: https://127.0.0.1:8443
    #[serde(default = "ServerConfig::default_base_url")]
    pub base_url: String,

    /// Accept self-signed or otherwise invalid TLS certificates.
    /// Default: false
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Request timeout in seconds.
    /// Default: 30
    #[serde(default = "ServerConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    fn default_base_url() -> String {
        "https://127.0.0.1:8443".to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            accept_invalid_certs: false,
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Logging and troubleshooting switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log login request/response detail at info level.
    /// Default: false
    #[serde(default)]
    pub verbose_login: bool,

    /// Tracing filter used when `ROLLCALL_LOG` is not set.
    /// Default: rollcall=warn
    #[serde(default = "DiagnosticsConfig::default_log_filter")]
    pub log_filter: String,
}

impl DiagnosticsConfig {
    fn default_log_filter() -> String {
        "rollcall=warn".to_string()
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            verbose_login: false,
            log_filter: Self::default_log_filter(),
        }
    }
}

/// Filesystem paths for client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where the persisted session document lives.
    /// Default: ~/.local/share/rollcall/session.json
    #[serde(default = "PathsConfig::default_session_file")]
    pub session_file: PathBuf,
}

impl PathsConfig {
    fn default_session_file() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".local/share/rollcall/session.json"))
            .unwrap_or_else(|| PathBuf::from(".local/share/rollcall/session.json"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            session_file: Self::default_session_file(),
        }
    }
}
