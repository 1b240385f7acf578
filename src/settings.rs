use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::RuleSet;
use crate::error::{KassaflytError, Result};

pub const TOKEN_ENV: &str = "FIKEN_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub company_slug: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_bank_account")]
    pub bank_account: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub dedupe_invoices: bool,
    #[serde(default)]
    pub rules: RuleSet,
}

fn default_api_base() -> String {
    "https://api.fiken.no/api/v2".to_string()
}

fn default_bank_account() -> String {
    "1920:10001".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_slug: String::new(),
            api_base: default_api_base(),
            api_token: String::new(),
            bank_account: default_bank_account(),
            output_dir: default_output_dir(),
            dedupe_invoices: false,
            rules: RuleSet::default(),
        }
    }
}

impl Settings {
    /// Token from the environment if set, otherwise the stored one.
    pub fn token(&self) -> String {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.api_token.clone())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("kassaflyt")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| KassaflytError::Settings(e.to_string()))?;
    let path = settings_path();
    std::fs::write(&path, format!("{json}\n"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            company_slug: "acme-as".to_string(),
            bank_account: "1920:20002".to_string(),
            dedupe_invoices: true,
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.company_slug, "acme-as");
        assert_eq!(loaded.bank_account, "1920:20002");
        assert!(loaded.dedupe_invoices);
        assert_eq!(loaded.rules, RuleSet::default());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.company_slug.is_empty());
        assert_eq!(s.bank_account, "1920:10001");
        assert_eq!(s.api_base, "https://api.fiken.no/api/v2");
        assert!(!s.dedupe_invoices);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"company_slug": "acme", "rules": {"software_accounts": ["6540"]}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.bank_account, "1920:10001");
        assert_eq!(s.output_dir, ".");
        assert!(s.rules.software_accounts.contains("6540"));
        assert!(s.rules.personnel_accounts.contains("5001"));
    }
}
