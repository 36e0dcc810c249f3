//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TIMEOUT_SECS;

pub const LOCAL_CONFIG: &str = "termexam.toml";
pub const ENV_BASE_URL: &str = "TERMEXAM_BASE_URL";
pub const ENV_TOKEN: &str = "TERMEXAM_TOKEN";

/// Custom Debug impl masks the token so it never reaches the log.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            request_timeout_secs: default_timeout(),
            log_file: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "termexam")
}

/// `termexam.log` in the platform data directory.
pub fn default_log_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().join("termexam.log"))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, which must exist when given
/// 2. `termexam.toml` in the current directory
/// 3. `config.toml` in the platform config directory
///
/// Environment overrides: `TERMEXAM_BASE_URL`, `TERMEXAM_TOKEN`.
pub fn load_config_from(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG);
            if local.exists() {
                Some(local)
            } else {
                project_dirs()
                    .map(|d| d.config_dir().join("config.toml"))
                    .filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading config");
            parse_file(&path)?
        }
        None => Config::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<Config>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        config.base_url = url;
    }
    if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
        config.token = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn explicit_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"https://exams.example.org\"\ntoken = \"abc\"\nrequest_timeout_secs = 5"
        )
        .unwrap();

        let config = parse_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://exams.example.org");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = [").unwrap();
        let err = parse_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        apply_env(&mut config, |key| match key {
            ENV_BASE_URL => Some("http://exam-host:9000".into()),
            ENV_TOKEN => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://exam-host:9000");
        assert!(config.token.is_none());
    }

    #[test]
    fn debug_masks_token() {
        let config = Config {
            token: Some("very-secret".into()),
            ..Config::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("***"));
    }
}
