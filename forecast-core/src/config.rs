use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    chat::ChatConfig,
    provider::{DEFAULT_SAMPLE_COUNT, ServiceId, openweather},
    search::AllowList,
};

/// Credentials for a single external service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: String,
}

/// Forecast endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,

    /// Samples per request (8 per day).
    #[serde(default = "default_sample_count")]
    pub count: u32,
}

fn default_forecast_base_url() -> String {
    openweather::DEFAULT_BASE_URL.to_string()
}

const fn default_sample_count() -> u32 {
    DEFAULT_SAMPLE_COUNT
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { base_url: default_forecast_base_url(), count: default_sample_count() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_place = "seoul"
/// cities = ["seoul", "incheon"]
///
/// [forecast]
/// count = 56
///
/// [services.openweather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Place shown when none is requested.
    #[serde(default = "default_place")]
    pub default_place: String,

    /// Search allow-list, matched exactly.
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    /// API keys keyed by service id.
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

fn default_place() -> String {
    "seoul".to_string()
}

fn default_cities() -> Vec<String> {
    AllowList::default().into_inner()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_place: default_place(),
            cities: default_cities(),
            forecast: ForecastConfig::default(),
            chat: ChatConfig::default(),
            services: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-dashboard", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API key for a service.
    pub fn upsert_service_api_key(&mut self, service: ServiceId, api_key: String) {
        self.services.insert(service.as_str().to_string(), ServiceConfig { api_key });
    }

    /// Stored API key for a service, if present.
    pub fn service_api_key(&self, service: ServiceId) -> Option<&str> {
        self.services.get(service.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// Environment override first, then the stored key. Blank values count as absent.
    pub fn resolve_api_key(&self, service: ServiceId) -> Option<String> {
        pick_api_key(std::env::var(service.env_var()).ok(), self.service_api_key(service))
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::new(self.cities.clone())
    }
}

fn pick_api_key(env_value: Option<String>, stored: Option<&str>) -> Option<String> {
    env_value
        .filter(|key| !key.trim().is_empty())
        .or_else(|| stored.filter(|key| !key.trim().is_empty()).map(str::to_owned))
}
