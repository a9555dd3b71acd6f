//! Application configuration: data source path and window geometry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the data file path.
pub const DATA_PATH_ENV: &str = "RETAIL_DASHBOARD_DATA";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "retail_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data_dashboard.csv"),
            window_width: 1400.0,
            window_height: 800.0,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the configuration from process arguments and environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let env_data_path = std::env::var(DATA_PATH_ENV).ok();
        Self::resolve(&args, env_data_path, Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Defaults, then a config file (a `.json` argument, else `default_file`
    /// when it exists), then the environment data path, then a non-JSON
    /// argument taken as the data path.
    pub fn resolve(
        args: &[String],
        env_data_path: Option<String>,
        default_file: &Path,
    ) -> Result<Self, ConfigError> {
        let (config_args, data_args): (Vec<&String>, Vec<&String>) =
            args.iter().partition(|a| a.ends_with(".json"));

        let mut config = match config_args.first() {
            Some(path) => Self::from_file(Path::new(path.as_str()))?,
            None if default_file.exists() => Self::from_file(default_file)?,
            None => Self::default(),
        };

        if let Some(path) = env_data_path.filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(path) = data_args.first() {
            config.data_path = PathBuf::from(path.as_str());
        }

        log::debug!("Resolved config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_default_file() -> PathBuf {
        std::env::temp_dir().join("retail_dashboard_no_such_config.json")
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&[], None, &no_default_file()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_env_and_argument_override_data_path() {
        let from_env =
            AppConfig::resolve(&[], Some("env.csv".to_string()), &no_default_file()).unwrap();
        assert_eq!(from_env.data_path, PathBuf::from("env.csv"));

        let from_arg = AppConfig::resolve(
            &["arg.csv".to_string()],
            Some("env.csv".to_string()),
            &no_default_file(),
        )
        .unwrap();
        assert_eq!(from_arg.data_path, PathBuf::from("arg.csv"));
    }

    #[test]
    fn test_config_file_partial_keys() {
        let path = std::env::temp_dir().join(format!(
            "retail_dashboard_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "data_path": "sales.csv", "window_width": 900 }"#).unwrap();
        let config = AppConfig::resolve(
            &[path.to_string_lossy().to_string()],
            None,
            &no_default_file(),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.data_path, PathBuf::from("sales.csv"));
        assert_eq!(config.window_width, 900.0);
        assert_eq!(config.window_height, 800.0);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let path = std::env::temp_dir().join(format!(
            "retail_dashboard_bad_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let result = AppConfig::resolve(&[], None, &path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
