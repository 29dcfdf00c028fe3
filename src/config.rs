use crate::model::preview::DEFAULT_PAGE_SIZE;
use crate::model::report::ReportDefinition;
use crate::services::ApiCredentials;
use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend root, e.g. `https://hr.example.com`
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Directory export files are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default)]
    pub reports: Vec<ReportDefinition>,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            api_secret: None,
            export_dir: default_export_dir(),
            default_page_size: DEFAULT_PAGE_SIZE,
            reports: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".report-export-tui"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load from `path`; `None` when missing or unreadable
    pub fn load_from(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn load() -> Option<Config> {
        Self::load_from(&Self::default_path()?)
    }

    /// Save the config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Key and secret, when both are set
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(ApiCredentials {
                    key: key.clone(),
                    secret: secret.clone(),
                })
            }
            _ => None,
        }
    }

    /// Reports from the config plus `extra`, or the built-in ones when both are empty
    pub fn catalogue(&self, extra: &[ReportDefinition]) -> Vec<ReportDefinition> {
        let mut reports: Vec<ReportDefinition> = self.reports.clone();
        reports.extend(extra.iter().cloned());
        if reports.is_empty() {
            ReportDefinition::builtin()
        } else {
            reports
        }
    }
}

/// Read a YAML list of report definitions
pub fn load_reports_file(path: &Path) -> anyhow::Result<Vec<ReportDefinition>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report catalogue: {}", path.display()))?;
    let reports: Vec<ReportDefinition> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid report catalogue: {}", path.display()))?;
    Ok(reports)
}

/// Check a server URL typed into the setup wizard
pub fn validate_base_url(input: &str) -> Result<(), String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Server URL cannot be empty".to_string());
    }
    let url = Url::parse(trimmed).map_err(|e| format!("Invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("Unsupported scheme '{}', use http or https", other)),
    }
    if url.host_str().is_none() {
        return Err("URL has no host".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::SchemaSource;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: "https://hr.example.com".to_string(),
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), Some(config));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"base_url": "http://localhost:8000"}"#).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.default_page_size, 10);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_catalogue_falls_back_to_builtin() {
        let config = Config::default();
        let names: Vec<String> = config.catalogue(&[]).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Employee Report", "Employee Summary"]);

        let extra = vec![ReportDefinition::dynamic("Companies", "Company")];
        assert_eq!(config.catalogue(&extra), extra);
    }

    #[test]
    fn test_load_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.yaml");
        fs::write(
            &path,
            "- name: Salary Slips\n  entity: Salary Slip\n  filters:\n    - field: docstatus\n      value: \"1\"\n\
             - name: Leave Summary\n  entity: Leave Application\n  source:\n    kind: static\n    fields:\n      - title: Employee\n      - title: Leave Type\n        fieldname: leave_type\n",
        )
        .unwrap();
        let reports = load_reports_file(&path).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].filters.len(), 1);
        assert!(matches!(reports[1].source, SchemaSource::Static { ref fields } if fields.len() == 2));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://hr.example.com").is_ok());
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("ftp://files.example.com").is_err());
        assert!(validate_base_url("hr.example.com").is_err());
    }
}
