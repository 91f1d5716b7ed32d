use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::Selectors;

/// Everything remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub username: String,
    pub password: String,
    pub keyword: String,
    pub location: String,
    pub easy_apply: bool,
    pub job_type: String,
    pub applied_companies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<Selectors>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            keyword: String::new(),
            location: String::new(),
            easy_apply: true,
            job_type: "remote".to_string(),
            applied_companies: Vec::new(),
            selectors: None,
        }
    }
}

impl Settings {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn has_applied_to(&self, company: &str) -> bool {
        self.applied_companies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(company.trim()))
    }

    /// Returns false when the company was already recorded.
    pub fn record_application(&mut self, company: &str) -> bool {
        let company = company.trim();
        if company.is_empty() || self.has_applied_to(company) {
            return false;
        }
        self.applied_companies.push(company.to_string());
        true
    }

    pub fn selectors(&self) -> Selectors {
        self.selectors.clone().unwrap_or_default()
    }
}

/// Load/save of the flat settings record.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings kept as an indented JSON file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            info!("No settings at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        settings
            .serialize(&mut serializer)
            .context("Failed to serialize settings")?;

        fs::write(&self.path, buf)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "job_autopilot_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let store = JsonSettingsStore::new(scratch_path("missing"));
        let settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.easy_apply);
        assert_eq!(settings.job_type, "remote");
    }

    #[test]
    fn saved_settings_load_back() {
        let path = scratch_path("roundtrip");
        let store = JsonSettingsStore::new(&path);

        let mut settings = Settings {
            username: "me@example.com".into(),
            keyword: "rust".into(),
            ..Settings::default()
        };
        settings.record_application("Acme");
        store.save(&settings).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"username\": \"me@example.com\""));
        assert!(!raw.contains("selectors"));

        assert_eq!(store.load().unwrap(), settings);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = scratch_path("partial");
        fs::write(&path, r#"{"username": "u", "easy_apply": false}"#).unwrap();

        let settings = JsonSettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.username, "u");
        assert!(!settings.easy_apply);
        assert_eq!(settings.job_type, "remote");
        assert!(settings.applied_companies.is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonSettingsStore::new(&path).load().is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn applications_are_recorded_once() {
        let mut settings = Settings::default();
        assert!(settings.record_application("Acme"));
        assert!(!settings.record_application("ACME "));
        assert!(!settings.record_application("  "));
        assert!(settings.has_applied_to("acme"));
        assert_eq!(settings.applied_companies, vec!["Acme".to_string()]);
    }
}
