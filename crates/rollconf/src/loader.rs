//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, RollConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Existing config files in standard locations, in load order
/// (system, then user, then local).
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Existing config files in load order, with an optional path from the
/// command line standing in for the local `./rollcall.toml` override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("/etc/rollcall/config.toml")];

    if let Some(dirs) = directories::BaseDirs::new() {
        candidates.push(dirs.config_dir().join("rollcall/config.toml"));
    }

    match cli_path {
        Some(path) => candidates.push(path.to_path_buf()),
        None => candidates.push(PathBuf::from("rollcall.toml")),
    }

    candidates.retain(|path| path.exists());
    candidates
}

/// Read a TOML file and apply its values on top of `config`.
///
/// Only keys present in the file are touched, so files layer field by
/// field in discovery order.
pub fn apply_file(config: &mut RollConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Apply values from a TOML string on top of `config`.
fn apply_toml(config: &mut RollConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    // Parse as raw TOML table so absent keys leave earlier values alone
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(server) = table.get("server").and_then(|v| v.as_table()) {
        if let Some(v) = server.get("base_url").and_then(|v| v.as_str()) {
            config.server.base_url = v.to_string();
        }
        if let Some(v) = server.get("accept_invalid_certs").and_then(|v| v.as_bool()) {
            config.server.accept_invalid_certs = v;
        }
        if let Some(v) = server.get("timeout_secs").and_then(|v| v.as_integer()) {
            config.server.timeout_secs = v as u64;
        }
    }

    if let Some(diagnostics) = table.get("diagnostics").and_then(|v| v.as_table()) {
        if let Some(v) = diagnostics.get("verbose_login").and_then(|v| v.as_bool()) {
            config.diagnostics.verbose_login = v;
        }
        if let Some(v) = diagnostics.get("log_filter").and_then(|v| v.as_str()) {
            config.diagnostics.log_filter = v.to_string();
        }
    }

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("session_file").and_then(|v| v.as_str()) {
            config.paths.session_file = expand_path(v);
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut RollConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("ROLLCALL_SERVER_URL") {
        config.server.base_url = v;
        sources.env_overrides.push("ROLLCALL_SERVER_URL".to_string());
    }
    if let Ok(v) = env::var("ROLLCALL_ACCEPT_INVALID_CERTS") {
        if let Some(flag) = parse_bool(&v) {
            config.server.accept_invalid_certs = flag;
            sources
                .env_overrides
                .push("ROLLCALL_ACCEPT_INVALID_CERTS".to_string());
        }
    }
    if let Ok(v) = env::var("ROLLCALL_TIMEOUT_SECS") {
        if let Ok(secs) = v.parse() {
            config.server.timeout_secs = secs;
            sources.env_overrides.push("ROLLCALL_TIMEOUT_SECS".to_string());
        }
    }

    if let Ok(v) = env::var("ROLLCALL_VERBOSE_LOGIN") {
        if let Some(flag) = parse_bool(&v) {
            config.diagnostics.verbose_login = flag;
            sources.env_overrides.push("ROLLCALL_VERBOSE_LOGIN".to_string());
        }
    }
    if let Ok(v) = env::var("ROLLCALL_LOG") {
        config.diagnostics.log_filter = v;
        sources.env_overrides.push("ROLLCALL_LOG".to_string());
    }

    if let Ok(v) = env::var("ROLLCALL_SESSION_FILE") {
        config.paths.session_file = expand_path(&v);
        sources.env_overrides.push("ROLLCALL_SESSION_FILE".to_string());
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(stripped),
            None => PathBuf::from(path),
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            match env::var(&stripped[..slash_pos]) {
                Ok(value) => PathBuf::from(value).join(&stripped[slash_pos + 1..]),
                Err(_) => PathBuf::from(path),
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
