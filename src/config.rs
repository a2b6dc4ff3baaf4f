use crate::constants::{DEFAULT_BACKEND_URL, DEFAULT_MODEL};
use crate::errors::{BeautiragError, BeautiragResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub default_model: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Base URL without a trailing slash, ready for endpoint paths to be appended.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Directory for log files, falling back to `~/.config/beautirag/logs`.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            config_dir()
                .map(|dir| dir.join("logs"))
                .unwrap_or_else(|_| PathBuf::from("logs"))
        })
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Loads `.env`, the config file and the environment, validates the result and
/// installs it as the process-wide config.
pub fn initialize_config() -> BeautiragResult<()> {
    dotenv::dotenv().ok();

    let config_path = config_dir()?.join("config.json");
    let config = load_config(&config_path, |key| env::var(key).ok())?;

    *CONFIG
        .write()
        .map_err(|_| BeautiragError::config_error("config lock poisoned"))? = config;

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG
        .read()
        .map(|config| config.clone())
        .unwrap_or_default()
}

/// Layers the optional JSON file and then the environment on top of the defaults.
pub fn load_config<F>(config_path: &Path, lookup: F) -> BeautiragResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if config_path.exists() {
        let config_str = fs::read_to_string(config_path).map_err(|e| {
            BeautiragError::config_error(format!("Failed to read config file: {}", e))
        })?;
        serde_json::from_str(&config_str)
            .map_err(|e| BeautiragError::config_error(format!("Failed to parse config: {}", e)))?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("BEAUTIRAG_BACKEND_URL").or_else(|| non_empty("NEXT_PUBLIC_BACKEND_URL")) {
        config.backend_url = url;
    }
    if let Some(model) = non_empty("BEAUTIRAG_DEFAULT_MODEL") {
        config.default_model = model;
    }
    if let Some(level) = non_empty("BEAUTIRAG_LOG_LEVEL") {
        config.log_level = level;
    }
}

fn config_dir() -> BeautiragResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| BeautiragError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join("beautirag"))
}

fn validate_config(config: &Config) -> BeautiragResult<()> {
    let url = config.backend_url.trim();
    let Some(rest) = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
    else {
        return Err(BeautiragError::config_error(format!(
            "backend_url must be an http(s) URL, got '{}'",
            config.backend_url
        )));
    };
    if rest.trim_matches('/').is_empty() {
        return Err(BeautiragError::config_error("backend_url is missing a host"));
    }

    if config.default_model.trim().is_empty() {
        return Err(BeautiragError::config_error("Model name is required"));
    }

    if config.log_level.trim().is_empty() {
        return Err(BeautiragError::config_error("log_level must not be empty"));
    }

    Ok(())
}
