//! Configuration management module.
//!
//! This module handles loading and saving the engine configuration: the
//! API base URL, the request timeout and retry policy, the autosave
//! interval, and where progress snapshots are stored.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/meyousafe";

/// Oversees management of configuration file.
///
#[derive(Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub autosave_interval_secs: u64,
    pub storage_dir: Option<PathBuf>,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_autosave_interval_secs() -> u64 {
    30
}

impl Config {
    /// Return a new instance with default settings.
    ///
    pub fn new() -> Config {
        Config {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            autosave_interval_secs: default_autosave_interval_secs(),
            storage_dir: None,
            file_path: None,
        }
    }

    /// Try to load an existing configuration from the disk using the custom
    /// path if provided. A missing file leaves the defaults in place; the
    /// file is created on the first save.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        // Try to create dir path if it doesn't exist
        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectoryFailed {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        // Specify config file path
        self.file_path = Some(dir_path.join(Path::new(FILE_NAME)));
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;

        if file_path.exists() {
            let contents = fs::read_to_string(file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            self.api_base_url = data.api_base_url;
            self.request_timeout_secs = data.request_timeout_secs;
            self.max_retries = data.max_retries;
            self.retry_delay_ms = data.retry_delay_ms;
            self.autosave_interval_secs = data.autosave_interval_secs;
            self.storage_dir = data.storage_dir;
        }

        Ok(())
    }

    /// Save the current configuration to disk.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let data = FileSpec {
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            autosave_interval_secs: self.autosave_interval_secs,
            storage_dir: self.storage_dir.clone(),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    /// Returns the path buffer for the default path to the configuration
    /// file or an error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.autosave_interval(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_save_before_load_fails() {
        let config = Config::new();
        assert!(config.save().is_err());
    }

    #[test]
    fn test_load_missing_file_keeps_defaults() {
        let directory = std::env::temp_dir().join(format!("meyousafe-config-{}", Uuid::new_v4()));
        let mut config = Config::new();
        config
            .load(Some(directory.to_str().unwrap()))
            .expect("load should succeed without a file");
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn test_save_load_round_trip() {
        let directory = std::env::temp_dir().join(format!("meyousafe-config-{}", Uuid::new_v4()));
        let dir_str = directory.to_str().unwrap().to_owned();

        let mut config = Config::new();
        config.load(Some(&dir_str)).unwrap();
        config.api_base_url = "https://api.example.org/v1".to_string();
        config.max_retries = 5;
        config.save().unwrap();

        let mut reloaded = Config::new();
        reloaded.load(Some(&dir_str)).unwrap();
        assert_eq!(reloaded.api_base_url, "https://api.example.org/v1");
        assert_eq!(reloaded.max_retries, 5);
        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let directory = std::env::temp_dir().join(format!("meyousafe-config-{}", Uuid::new_v4()));
        fs::create_dir_all(&directory).unwrap();
        fs::write(
            directory.join(FILE_NAME),
            "api_base_url: https://api.example.org/v1\n",
        )
        .unwrap();

        let mut config = Config::new();
        config.load(Some(directory.to_str().unwrap())).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.org/v1");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.autosave_interval_secs, 30);
        let _ = fs::remove_dir_all(&directory);
    }
}
