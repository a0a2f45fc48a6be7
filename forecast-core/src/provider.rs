use crate::{Config, RawForecastResponse, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};
use thiserror::Error;

pub mod openweather;

/// Sample count requested per fetch: 7 days of 3-hour samples.
pub const DEFAULT_SAMPLE_COUNT: u32 = 56;

/// External services that need credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    OpenWeather,
    OpenAi,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::OpenAi => "openai",
        }
    }

    /// Environment variable that overrides the stored key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "OPENWEATHER_API_KEY",
            ServiceId::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::OpenAi]
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "openai" => Ok(ServiceId::OpenAi),
            _ => {
                let supported: Vec<&str> = ServiceId::all().iter().map(ServiceId::as_str).collect();
                Err(anyhow::anyhow!(
                    "Unknown service '{value}'. Supported services: {}.",
                    supported.join(", ")
                ))
            }
        }
    }
}

/// Why a forecast could not be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to reach forecast service: {0}")]
    Network(String),

    #[error("Forecast request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse forecast response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    /// One request for `place`, asking for `count` 3-hour samples.
    async fn fetch_forecast(&self, place: &str, count: u32)
    -> Result<RawForecastResponse, FetchError>;
}

/// Construct the OpenWeather client from config, resolving its API key.
pub fn forecast_source_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let id = ServiceId::OpenWeather;
    let api_key = config.resolve_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for service '{id}'.\n\
                 Hint: run `forecast configure {id}` or set {}.",
            id.env_var()
        )
    })?;

    Ok(OpenWeatherClient::new(api_key, config.forecast.base_url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn service_id_as_str_roundtrip() {
        for id in ServiceId::all() {
            let parsed = ServiceId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn service_id_is_case_insensitive() {
        assert_eq!(ServiceId::try_from("OpenWeather").unwrap(), ServiceId::OpenWeather);
    }

    #[test]
    fn unknown_service_error() {
        let err = ServiceId::try_from("darksky").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown service 'darksky'"));
        assert!(msg.contains("Supported services: openweather, openai."));
    }

    #[test]
    fn forecast_source_errors_when_missing_api_key() {
        if std::env::var_os(ServiceId::OpenWeather.env_var()).is_some() {
            return;
        }
        let cfg = Config::default();
        let err = forecast_source_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured for service 'openweather'"));
        assert!(msg.contains("forecast configure openweather"));
    }

    #[test]
    fn forecast_source_works_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_service_api_key(ServiceId::OpenWeather, "KEY".to_string());

        assert!(forecast_source_from_config(&cfg).is_ok());
    }
}
