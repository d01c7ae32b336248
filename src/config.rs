use crate::{
    constants::{APP_DIR_NAME, DEFAULT_SERVER_URL, LOG_LEVELS},
    errors::{ChatError, ChatResult},
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const SERVER_URL_VAR: &str = "CHATLINE_SERVER_URL";
pub const LOG_LEVEL_VAR: &str = "CHATLINE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the chat service. `/chat` is appended to it.
    pub server_url: String,
    /// Unset means the default for the log target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Directory for log files in terminal mode. Defaults to the cache dir.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            log_level: None,
            log_dir: None,
        }
    }
}

/// Result of loading the configuration at start-up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// The file did not exist and was written with defaults.
    pub created: bool,
}

/// Loads `.env`, the config file and environment overrides, then validates
/// the result. Runs before logging starts, so it does not log.
pub fn initialize_config() -> ChatResult<LoadedConfig> {
    // A missing .env is fine.
    let _ = dotenv::dotenv();

    let path = get_config_path()?;
    let (mut config, created) = load_or_create(&path)?;
    apply_overrides(&mut config, |key| env::var(key).ok());
    validate_config(&config)?;
    Ok(LoadedConfig {
        config,
        path,
        created,
    })
}

pub fn get_config_path() -> ChatResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine config directory"))?;

    Ok(config_dir.join(APP_DIR_NAME).join("config.json"))
}

/// Reads the config at `path`, writing the defaults there first if it does
/// not exist yet. The flag is `true` when the file was written.
pub fn load_or_create(path: &Path) -> ChatResult<(Config, bool)> {
    if path.exists() {
        let config_str = fs::read_to_string(path)
            .map_err(|e| ChatError::config_error(format!("Failed to read config file: {}", e)))?;

        let config = serde_json::from_str(&config_str)
            .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)))?;
        return Ok((config, false));
    }

    let config = Config::default();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(&config)
        .map_err(|e| ChatError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok((config, true))
}

/// Applies `CHATLINE_*` overrides looked up through `lookup`.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(SERVER_URL_VAR).filter(|v| !v.trim().is_empty()) {
        config.server_url = url.trim().to_string();
    }
    if let Some(level) = lookup(LOG_LEVEL_VAR).filter(|v| !v.trim().is_empty()) {
        config.log_level = Some(level.trim().to_lowercase());
    }
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    let url = Url::parse(&config.server_url).map_err(|e| {
        ChatError::config_error(format!("Invalid server_url '{}': {}", config.server_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ChatError::config_error(format!(
            "server_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if let Some(level) = &config.log_level {
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ChatError::config_error(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_url() {
        let mut config = Config::default();
        config.server_url = "not a url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_scheme() {
        let mut config = Config::default();
        config.server_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_log_level() {
        let mut config = Config::default();
        config.log_level = Some("loud".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let (config, created) = load_or_create(&path).unwrap();

        assert!(created);
        assert_eq!(config, Config::default());
        assert!(path.exists());
        let written: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, config);

        let (reloaded, created) = load_or_create(&path).unwrap();
        assert!(!created);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_or_create_reads_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "server_url": "https://chat.example.org" }"#).unwrap();

        let (config, created) = load_or_create(&path).unwrap();

        assert!(!created);
        assert_eq!(config.server_url, "https://chat.example.org");
        assert_eq!(config.log_level, None);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_log_level_in_file_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "log_level": "info" }"#).unwrap();

        let (config, _) = load_or_create(&path).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_or_create_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(load_or_create(&path), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            (SERVER_URL_VAR, " http://10.0.0.2:8080 "),
            (LOG_LEVEL_VAR, "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_apply_overrides_ignores_blank_values() {
        let mut config = Config::default();
        apply_overrides(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config, Config::default());
    }
}
