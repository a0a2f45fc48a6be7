//! Upstream forecast payload, as returned by the OpenWeather `forecast` endpoint.
//!
//! Every field that the provider may omit is optional or defaulted so that a
//! partial entry (or an error reply without `list`/`city`) still deserializes.
//! Fallbacks for missing values are applied later, at conversion time.

use serde::{Deserialize, Serialize};

/// `cod` is a string on success (`"200"`) but some error replies send a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Text(String),
    Number(i64),
}

impl ResponseCode {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            ResponseCode::Text(s) => s.trim().parse().ok(),
            ResponseCode::Number(n) => u16::try_from(*n).ok(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.as_u16().is_some_and(|code| (200..300).contains(&code))
    }
}

/// `message` is a numeric field on success and a human-readable reason on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseMessage {
    Count(f64),
    Text(String),
}

/// Raw multi-day forecast: an ascending series of 3-hour samples plus the place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForecastResponse {
    pub cod: Option<ResponseCode>,
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub cnt: u32,
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    pub city: Option<Place>,
}

impl RawForecastResponse {
    /// Upstream error text, if the reply carried one (e.g. "city not found").
    pub fn error_message(&self) -> Option<&str> {
        match &self.message {
            Some(ResponseMessage::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// One 3-hour weather sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix seconds.
    #[serde(default)]
    pub dt: i64,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub dt_txt: String,
    #[serde(default)]
    pub main: Measurements,
    /// First element is authoritative.
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub wind: Wind,
    /// Meters.
    pub visibility: Option<f64>,
    /// Probability of precipitation, 0..=1.
    pub pop: Option<f64>,
    pub rain: Option<Precipitation>,
    pub sys: Option<PartOfDay>,
}

impl ForecastEntry {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    /// Time-of-day component of `dt_txt`, if present.
    pub fn time_of_day(&self) -> Option<&str> {
        self.dt_txt.split_once(' ').map(|(_, time)| time)
    }
}

/// Temperatures in Kelvin, pressures in hPa, humidity in percent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurements {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub sea_level: Option<f64>,
    pub grnd_level: Option<f64>,
    pub humidity: Option<f64>,
    pub temp_kf: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    /// Category, e.g. "Rain" or "Clouds".
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    /// Cloud cover, percent.
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    /// m/s
    pub speed: Option<f64>,
    /// Meteorological degrees.
    pub deg: Option<f64>,
    /// m/s
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Precipitation {
    /// Volume over the last 3 hours, mm.
    #[serde(rename = "3h")]
    pub last_3h: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartOfDay {
    /// `d` for day, `n` for night.
    pub pod: Option<String>,
}

/// Static description of the forecast location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub coord: Option<Coordinate>,
    pub country: String,
    pub population: u64,
    /// UTC offset in seconds.
    pub timezone: i32,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}
