//! Collaborator base-URL resolution
//!
//! Priority order:
//! 1. Command-line argument (highest)
//! 2. `KASHI_BASE_URL` environment variable
//! 3. TOML config file (`~/.config/kashi/config.toml`, key `base_url`)
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file never prevents startup; resolution
//! degrades to the default with a warning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default collaborator endpoint (local dev server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Environment variable consulted after the CLI argument
pub const BASE_URL_ENV_VAR: &str = "KASHI_BASE_URL";

/// TOML config file schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the filter/search collaborator services
    pub base_url: Option<String>,
}

/// Resolve the collaborator base URL from all sources
pub fn resolve_base_url(cli_arg: Option<&str>) -> String {
    let env_value = std::env::var(BASE_URL_ENV_VAR).ok();
    let file_value = load_config_file().and_then(|config| config.base_url);

    let (base_url, source) = resolve_from(cli_arg, env_value.as_deref(), file_value.as_deref());
    info!(base_url = %base_url, source, "Collaborator base URL resolved");
    base_url
}

/// Pure resolution over already-gathered source values
///
/// Blank values are treated as absent at every tier. Trailing slashes are
/// trimmed so clients can join paths uniformly.
fn resolve_from(
    cli_arg: Option<&str>,
    env_value: Option<&str>,
    file_value: Option<&str>,
) -> (String, &'static str) {
    let tiers = [
        (cli_arg, "command-line"),
        (env_value, "environment"),
        (file_value, "config file"),
    ];

    for (value, source) in tiers {
        if let Some(value) = value {
            if !value.trim().is_empty() {
                return (value.trim().trim_end_matches('/').to_string(), source);
            }
        }
    }

    (DEFAULT_BASE_URL.to_string(), "default")
}

/// Platform config file path (`<config dir>/kashi/config.toml`)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kashi").join("config.toml"))
}

fn load_config_file() -> Option<TomlConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "No config file; continuing with defaults");
        return None;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file unreadable; ignoring");
            return None;
        }
    };

    match toml::from_str::<TomlConfig>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file invalid; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_argument_has_highest_priority() {
        let (url, source) = resolve_from(
            Some("http://cli:1"),
            Some("http://env:2"),
            Some("http://file:3"),
        );
        assert_eq!(url, "http://cli:1");
        assert_eq!(source, "command-line");
    }

    #[test]
    fn test_env_beats_file() {
        let (url, source) = resolve_from(None, Some("http://env:2"), Some("http://file:3"));
        assert_eq!(url, "http://env:2");
        assert_eq!(source, "environment");
    }

    #[test]
    fn test_file_beats_default() {
        let (url, source) = resolve_from(None, None, Some("http://file:3/"));
        assert_eq!(url, "http://file:3");
        assert_eq!(source, "config file");
    }

    #[test]
    fn test_default_when_nothing_configured() {
        let (url, source) = resolve_from(None, None, None);
        assert_eq!(url, DEFAULT_BASE_URL);
        assert_eq!(source, "default");
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let (url, source) = resolve_from(Some("   "), Some(""), None);
        assert_eq!(url, DEFAULT_BASE_URL);
        assert_eq!(source, "default");
    }

    #[test]
    fn test_toml_schema_parses() {
        let config: TomlConfig = toml::from_str("base_url = \"http://10.0.0.2:5000\"").unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://10.0.0.2:5000"));

        // Empty file is valid (backward compatible)
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.base_url.is_none());
    }
}
