//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "libris.toml";

/// Environment variable that overrides `api.base_url`
pub const BASE_URL_ENV: &str = "LIBRIS_API_BASE_URL";

/// Load configuration from libris.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration, falling back to defaults when no libris.toml exists
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => load_config_from_path(path)?,
        None => match load_config() {
            Ok(config) => config,
            Err(Error::ConfigNotFound) => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
                Config::default()
            }
            Err(e) => return Err(e),
        },
    };

    if let Ok(base_url) = env::var(BASE_URL_ENV) {
        if !base_url.is_empty() {
            config.api.base_url = base_url;
        }
    }

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Write configuration as TOML
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Libris Configuration

[api]
# Base URL of the library backend; every endpoint path is joined onto it.
# Overridden by the LIBRIS_API_BASE_URL environment variable.
base_url = "${LIBRIS_API_BASE_URL:-http://localhost:8080/api/v1}"
timeout_secs = 30

[session]
# "file" keeps you logged in between runs, "memory" forgets on exit
storage = "file"
# path = "./.libris/session.json"

[output]
format = "table"  # or "json", "yaml"
"#
}
