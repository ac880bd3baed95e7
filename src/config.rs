//! Kiosk configuration (kiosk.toml)
//!
//! Every field has a default, so an empty file or no file at all yields a
//! working kiosk pointed at the production backend.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::card::{parse_uid, ResidentEntry};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub app_name: String,
    pub app_version: String,
    /// UID of the service card that opens configuration mode on the splash
    pub admin_card_uid: String,
    pub api: ApiConfig,
    pub site: SiteConfig,
    pub timing: TimingConfig,
    pub report: ReportConfig,
    /// Residents added on top of the built-in table
    pub residents: Vec<ResidentEntry>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            app_name: "GenLink Kiosk".to_string(),
            app_version: "1.0.0".to_string(),
            admin_card_uid: "C0:F4:E4:5F".to_string(),
            api: ApiConfig::default(),
            site: SiteConfig::default(),
            timing: TimingConfig::default(),
            report: ReportConfig::default(),
            residents: Vec::new(),
        }
    }
}

/// Backend endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub submit_timeout_ms: u64,
    pub report_types_timeout_ms: u64,
    pub metric_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hackheroes-2025-backend.onrender.com".to_string(),
            submit_timeout_ms: 5000,
            report_types_timeout_ms: 15000,
            metric_timeout_ms: 5000,
        }
    }
}

impl ApiConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn report_types_timeout(&self) -> Duration {
        Duration::from_millis(self.report_types_timeout_ms)
    }

    pub fn metric_timeout(&self) -> Duration {
        Duration::from_millis(self.metric_timeout_ms)
    }
}

/// Where the kiosk is installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub building_address: String,
    pub city: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            building_address: "ul. Przykladowa 10".to_string(),
            city: "Krakow".to_string(),
        }
    }
}

/// Loop and retry timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Main loop period
    pub tick_interval_ms: u64,
    /// Spacing between report-type fetch attempts until one succeeds
    pub report_types_retry_ms: u64,
    /// Splash stays up at least this long (and admin override works only within it)
    pub splash_min_display_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            report_types_retry_ms: 30_000,
            splash_min_display_ms: 5_000,
        }
    }
}

/// Fixed fields of the submitted report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub problem_tag: String,
    pub details: String,
    pub report_type_id: u32,
    pub age: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            problem_tag: "[GenLink Kiosk]".to_string(),
            details: "Zgloszenie zlozone z GenLink Kiosk".to_string(),
            report_type_id: 1,
            age: 1,
        }
    }
}

impl KioskConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse TOML configuration content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Admin card UID bytes, if the configured string is valid
    pub fn admin_uid(&self) -> Option<Vec<u8>> {
        parse_uid(&self.admin_card_uid)
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.timing.tick_interval_ms == 0 {
            anyhow::bail!("timing.tick_interval_ms must be positive");
        }
        if !self.admin_card_uid.is_empty() && self.admin_uid().is_none() {
            anyhow::bail!("admin_card_uid is not a hex UID: {}", self.admin_card_uid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KioskConfig::parse("").unwrap();
        assert_eq!(config, KioskConfig::default());
        assert_eq!(config.timing.report_types_retry_ms, 30_000);
        assert_eq!(config.admin_uid(), Some(vec![0xC0, 0xF4, 0xE4, 0x5F]));
    }

    #[test]
    fn test_partial_override() {
        let content = r#"
app_name = "Test Kiosk"

[api]
base_url = "http://localhost:8000"

[[residents]]
uid = "AA:BB:CC:DD"
name = "Ewa Test"
phone = "600000009"
apartment = 3
"#;
        let config = KioskConfig::parse(content).unwrap();
        assert_eq!(config.app_name, "Test Kiosk");
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.submit_timeout(), Duration::from_secs(5));
        assert_eq!(config.residents.len(), 1);
        assert_eq!(config.site.city, "Krakow");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(KioskConfig::parse("admin_card_uid = \"nope\"").is_err());
        assert!(KioskConfig::parse("[timing]\ntick_interval_ms = 0").is_err());
        assert!(KioskConfig::parse("[api]\nbase_url = \" \"").is_err());
    }

    #[test]
    fn test_toml_roundtrip_through_file() {
        let config = KioskConfig::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", config.to_toml().unwrap()).unwrap();

        let loaded = KioskConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = KioskConfig::load(Path::new("/nonexistent/kiosk.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/kiosk.toml"));
    }
}
