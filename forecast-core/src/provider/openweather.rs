use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::model::RawForecastResponse;

use super::{FetchError, ForecastSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the OpenWeather 5-day / 3-hour forecast endpoint.
///
/// No timeout or retry is configured; a request runs until the upstream answers.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_forecast(
        &self,
        place: &str,
        count: u32,
    ) -> Result<RawForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.base_url);
        let count = count.to_string();
        debug!("dispatching forecast request");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", place),
                ("appid", self.api_key.as_str()),
                ("cnt", count.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let message = upstream_message(&body).unwrap_or_else(|| truncate_body(&body));
            warn!(status = status.as_u16(), %message, "forecast request rejected");
            return Err(FetchError::Status { status: status.as_u16(), message });
        }

        let parsed: RawForecastResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        // Some error replies come back as 200 with the real code in the body.
        if let Some(code) = parsed.cod.as_ref().filter(|code| !code.is_success()) {
            let message = parsed.error_message().unwrap_or("unknown error").to_string();
            return Err(FetchError::Status { status: code.as_u16().unwrap_or_default(), message });
        }

        debug!(entries = parsed.list.len(), "forecast received");
        Ok(parsed)
    }
}

fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<RawForecastResponse>(body)
        .ok()
        .and_then(|raw| raw.error_message().map(str::to_owned))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
