use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve home directory for global config path")]
    HomeDirectoryUnavailable,
}

pub const GLOBAL_STATE_DIR: &str = ".researchflow";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_PIPELINE_FILE_NAME: &str = "pipeline.yaml";

/// Local client settings. The API token is optional so the tool works fully
/// offline against a pipeline file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_file: Option<PathBuf>,
}

impl ClientSettings {
    pub fn pipeline_file_or_default(&self, state_root: &Path) -> PathBuf {
        self.pipeline_file
            .clone()
            .unwrap_or_else(|| state_root.join(DEFAULT_PIPELINE_FILE_NAME))
    }
}

pub fn default_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    Ok(default_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

/// Loads settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<ClientSettings, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ClientSettings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn save_settings(path: &Path, settings: &ClientSettings) -> Result<(), ConfigError> {
    let raw = serde_yaml::to_string(settings).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    fs::write(path, raw).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&dir.path().join("absent.yaml")).expect("defaults");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn settings_round_trip_through_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.yaml");
        let settings = ClientSettings {
            api_base: Some("https://api.example.test/v1".to_string()),
            api_token: Some("secret".to_string()),
            pipeline_file: Some(PathBuf::from("/tmp/pipeline.yaml")),
        };
        save_settings(&path, &settings).expect("save");
        let loaded = load_settings(&path).expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn pipeline_file_defaults_under_the_state_root() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.pipeline_file_or_default(Path::new("/home/user/.researchflow")),
            PathBuf::from("/home/user/.researchflow/pipeline.yaml")
        );
    }

    #[test]
    fn invalid_yaml_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api_base: [unterminated").expect("write");
        assert!(matches!(
            load_settings(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
