use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::editing::controller::PageSettings;
use crate::storage::loader::FallbackSource;

const DEFAULT_PUBLIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// The single storage entry holding the saved profile; `None` keeps it in memory.
    pub storage_path: Option<PathBuf>,
    /// Stylesheet, script, images and the fallback document.
    pub public_dir: PathBuf,
    /// When set, export and document fallback fetch over HTTP instead of reading `public_dir`.
    pub asset_base_url: Option<String>,
    pub fallback: FallbackSource,
    pub reset_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_path: Some(env_or("CV_STORAGE_PATH", "data/userData.json"))
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            public_dir: env_or("CV_PUBLIC_DIR", DEFAULT_PUBLIC_DIR).into(),
            asset_base_url: std::env::var("CV_ASSET_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            fallback: FallbackSource::parse(&env_or("CV_FALLBACK", "embedded")),
            reset_enabled: parse_flag(&env_or("CV_RESET_ENABLED", "false"))
                .context("CV_RESET_ENABLED must be true or false")?,
        })
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            fallback: self.fallback.clone(),
            reset_enabled: self.reset_enabled,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag(" YES ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_page_settings_follow_config() {
        let config = Config {
            port: 8080,
            rust_log: "info".into(),
            storage_path: Some("data/userData.json".into()),
            public_dir: DEFAULT_PUBLIC_DIR.into(),
            asset_base_url: None,
            fallback: FallbackSource::Document("data.json".into()),
            reset_enabled: true,
        };
        assert_eq!(
            config.page_settings(),
            PageSettings {
                fallback: FallbackSource::Document("data.json".into()),
                reset_enabled: true,
            }
        );
    }
}
