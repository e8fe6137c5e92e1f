use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::models::Subject;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Shipped defaults, copied to the user's config directory on first run.
pub const BLUEPRINT: &str = include_str!("../fba.toml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api_base: String,
    pub subject: String,
    pub timeout_secs: Option<u64>,
    pub remember_subject: bool,
    pub log_file: Option<String>,
}

impl Settings {
    /// Loads defaults, then the user config, then `./fba.toml`, then the `API_BASE` override.
    pub fn new(api_base_override: Option<String>) -> Result<Self, ConfigError> {
        let user_config_path = get_user_config_path();

        if !user_config_path.exists() {
            if let Some(parent) = user_config_path.parent() {
                if fs::create_dir_all(parent).is_ok() && fs::write(&user_config_path, BLUEPRINT).is_ok() {
                    tracing::debug!("Created user config at {}", user_config_path.display());
                }
            }
        }

        Self::from_sources(Some(&user_config_path), Some(Path::new("fba.toml")), api_base_override)
    }

    pub fn from_sources(
        user_config: Option<&Path>,
        local_config: Option<&Path>,
        api_base_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("subject", Subject::default().name())?
            .set_default("remember_subject", true)?;

        for path in [user_config, local_config].into_iter().flatten() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let s = builder.set_override_option("api_base", api_base_override)?.build()?;
        let mut settings: Settings = s.try_deserialize()?;
        settings.api_base = settings.api_base.trim_end_matches('/').to_string();
        Ok(settings)
    }

    /// Configured default subject; an unknown name falls back to the first subject.
    pub fn default_subject(&self) -> Subject {
        Subject::from_str(&self.subject).unwrap_or_else(|e| {
            tracing::warn!("{}, using {}", e, Subject::default());
            Subject::default()
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => get_user_config_path().with_file_name("fba.log"),
        }
    }
}

pub fn get_user_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("feedback-analyzer");
    path.push("fba.toml");
    path
}

pub fn save_subject(subject: Subject) -> Result<(), anyhow::Error> {
    save_subject_to(&get_user_config_path(), subject)
}

pub fn save_subject_to(config_path: &Path, subject: Subject) -> Result<(), anyhow::Error> {
    let config_str = fs::read_to_string(config_path).unwrap_or_else(|_| "".to_string());
    let mut doc = config_str.parse::<toml::Table>()?;

    doc.insert("subject".to_string(), toml::Value::String(subject.name().to_string()));

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, doc.to_string())?;

    Ok(())
}
