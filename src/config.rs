use crate::application::engine::ImportConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::parser::ParseMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, trace};

pub const ENV_PROXY_URL: &str = "MARKPORT_PROXY_URL";
pub const ENV_BATCH_SIZE: &str = "MARKPORT_BATCH_SIZE";
pub const ENV_MAX_RETRIES: &str = "MARKPORT_MAX_RETRIES";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImportSettings {
    /// How CSV lines are mapped to rows (default: "positional")
    #[serde(default)]
    pub parse_mode: ParseMode,

    /// Reject rows without a title (default: false)
    #[serde(default)]
    pub require_title: bool,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_mega_batch_size")]
    pub mega_batch_size: usize,

    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    #[serde(default = "default_mega_batch_delay_ms")]
    pub mega_batch_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_adaptive_increase")]
    pub adaptive_increase: f64,

    #[serde(default = "default_adaptive_decrease")]
    pub adaptive_decrease: f64,

    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

fn default_batch_size() -> usize {
    25
}
fn default_mega_batch_size() -> usize {
    100
}
fn default_batch_delay_ms() -> u64 {
    2000
}
fn default_mega_batch_delay_ms() -> u64 {
    10_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_adaptive_increase() -> f64 {
    1.5
}
fn default_adaptive_decrease() -> f64 {
    0.9
}
fn default_progress_interval() -> usize {
    5
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::default(),
            require_title: false,
            batch_size: default_batch_size(),
            mega_batch_size: default_mega_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            mega_batch_delay_ms: default_mega_batch_delay_ms(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            adaptive_increase: default_adaptive_increase(),
            adaptive_decrease: default_adaptive_decrease(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl From<&ImportSettings> for ImportConfig {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            mega_batch_size: settings.mega_batch_size,
            batch_delay: Duration::from_millis(settings.batch_delay_ms),
            mega_batch_delay: Duration::from_millis(settings.mega_batch_delay_ms),
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            adaptive_increase: settings.adaptive_increase,
            adaptive_decrease: settings.adaptive_decrease,
            progress_interval: settings.progress_interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Base URL of the credential-forwarding proxy
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Batching, pacing and parsing options
    #[serde(default)]
    pub import: ImportSettings,
}

fn default_proxy_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            import: ImportSettings::default(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config/markport/config.toml"))
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    let config_text = std::fs::read_to_string(path)
        .map_err(|e| DomainError::Configuration(format!("Cannot read {:?}: {}", path, e)))?;
    toml::from_str::<Settings>(&config_text)
        .map_err(|e| DomainError::Configuration(format!("Invalid config {:?}: {}", path, e)))
}

fn env_number<T: std::str::FromStr>(name: &str) -> DomainResult<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DomainError::Configuration(format!("{} is not a number: {}", name, value))),
        Err(_) => Ok(None),
    }
}

/// Load settings from a config file and environment variables.
///
/// An explicit `config_path` must exist; the default location is optional.
#[instrument(level = "debug")]
pub fn load_settings(config_path: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_path {
        Some(path) => {
            debug!("Loading config from: {:?}", path);
            read_config_file(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from: {:?}", path);
                read_config_file(&path)?
            }
            _ => Settings::default(),
        },
    };

    // Override with environment variables
    if let Ok(proxy_url) = std::env::var(ENV_PROXY_URL) {
        trace!("Using {} from environment: {}", ENV_PROXY_URL, proxy_url);
        settings.proxy_url = proxy_url;
    }
    if let Some(batch_size) = env_number::<usize>(ENV_BATCH_SIZE)? {
        settings.import.batch_size = batch_size;
    }
    if let Some(max_retries) = env_number::<u32>(ENV_MAX_RETRIES)? {
        settings.import.max_retries = max_retries;
    }

    trace!("Settings loaded: {:?}", settings);
    Ok(settings)
}

pub fn generate_default_config() -> String {
    let default_settings = Settings::default();
    toml::to_string_pretty(&default_settings)
        .unwrap_or_else(|_| "# Error generating default configuration".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    #[serial]
    fn given_explicit_config_file_when_load_then_values_applied() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file(
            r#"
            proxy_url = "https://proxy.example.com"

            [import]
            parse_mode = "lenient"
            batch_size = 10
            mega_batch_delay_ms = 500
            "#,
        );

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.proxy_url, "https://proxy.example.com");
        assert_eq!(settings.import.parse_mode, ParseMode::Lenient);
        assert_eq!(settings.import.batch_size, 10);
        assert_eq!(settings.import.mega_batch_delay_ms, 500);
        // untouched keys keep their defaults
        assert_eq!(settings.import.mega_batch_size, 100);
        assert_eq!(settings.import.max_retries, 3);
    }

    #[test]
    #[serial]
    fn given_missing_explicit_config_when_load_then_error() {
        let _guard = EnvGuard::new();
        let result = load_settings(Some(Path::new("/nonexistent/markport.toml")));
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }

    #[test]
    #[serial]
    fn given_environment_variables_when_load_then_override_file() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file(
            r#"
            proxy_url = "https://file.example.com"
            [import]
            batch_size = 10
            "#,
        );
        env::set_var(ENV_PROXY_URL, "http://env.example.com:8080");
        env::set_var(ENV_BATCH_SIZE, "7");
        env::set_var(ENV_MAX_RETRIES, "0");

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.proxy_url, "http://env.example.com:8080");
        assert_eq!(settings.import.batch_size, 7);
        assert_eq!(settings.import.max_retries, 0);
    }

    #[test]
    #[serial]
    fn given_non_numeric_env_when_load_then_configuration_error() {
        let _guard = EnvGuard::new();
        let (_dir, path) = create_temp_config_file("");
        env::set_var(ENV_BATCH_SIZE, "many");

        let result = load_settings(Some(&path));
        assert!(result.unwrap_err().to_string().contains(ENV_BATCH_SIZE));
    }

    #[test]
    fn given_default_config_when_generate_then_roundtrips_through_toml() {
        let text = generate_default_config();
        assert!(text.contains("proxy_url"));
        assert!(text.contains("[import]"));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn given_import_settings_when_convert_then_durations_in_millis() {
        let config = ImportConfig::from(&ImportSettings::default());
        assert_eq!(config, ImportConfig::default());
    }
}
