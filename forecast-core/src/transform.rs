//! Pure reshaping of a [`RawForecastResponse`] into display-ready view-models.
//!
//! Everything here is recomputed in full for every payload; nothing is cached.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::{
    model::{ForecastEntry, Place, RawForecastResponse},
    units::{
        self, CURRENT_FALLBACK_KELVIN, DEFAULT_VISIBILITY_M, DEFAULT_WIND_SPEED_MPS,
        FORECAST_FALLBACK_KELVIN,
    },
};

const MIDNIGHT: &str = "00:00:00";

const ROW_FALLBACK_ICON: &str = "02d";
const ROW_FALLBACK_DATE: &str = "12.09";
const ROW_FALLBACK_DAY: &str = "Monday";

/// Entry shown as "now". Index 0 sits too close to the window boundary, so the
/// second sample is used; `None` with fewer than two entries.
pub fn select_today(entries: &[ForecastEntry]) -> Option<&ForecastEntry> {
    entries.get(1)
}

/// Entries for the hourly strip. This is the whole series, not only today's samples.
pub fn select_today_strip(entries: &[ForecastEntry]) -> &[ForecastEntry] {
    entries
}

/// One entry per calendar day: the sample whose local time is exactly midnight.
///
/// Days without a midnight sample are skipped, nothing is backfilled.
pub fn select_daily_forecast(entries: &[ForecastEntry]) -> Vec<&ForecastEntry> {
    entries
        .iter()
        .filter(|entry| entry.time_of_day() == Some(MIDNIGHT))
        .collect()
}

/// Visibility, humidity, wind, pressure and sun times for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionDetail {
    pub visibility: String,
    pub humidity: String,
    pub wind_speed: String,
    pub air_pressure: String,
    pub sunrise: String,
    pub sunset: String,
}

impl ConditionDetail {
    pub fn from_entry(entry: Option<&ForecastEntry>, place: Option<&Place>) -> Self {
        let visibility = entry.and_then(|e| e.visibility).unwrap_or(DEFAULT_VISIBILITY_M);
        let wind_speed = entry.and_then(|e| e.wind.speed).unwrap_or(DEFAULT_WIND_SPEED_MPS);
        let humidity = entry.and_then(|e| e.main.humidity).unwrap_or_default();
        let pressure = entry.and_then(|e| e.main.pressure).unwrap_or_default();

        let offset = place.map(|p| p.timezone).unwrap_or_default();
        let sunrise = place.map(|p| p.sunrise).unwrap_or_default();
        let sunset = place.map(|p| p.sunset).unwrap_or_default();

        Self {
            visibility: units::meters_to_kilometers(visibility),
            humidity: format!("{humidity}%"),
            wind_speed: units::convert_wind_speed(wind_speed),
            air_pressure: format!("{pressure}hPa"),
            sunrise: units::unix_to_clock(sunrise, offset),
            sunset: units::unix_to_clock(sunset, offset),
        }
    }
}

/// Headline block for the "today" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    /// Weekday of the current local day at the place.
    pub weekday: &'static str,
    /// `YYYY.MM.DD` of today's entry, empty when unknown.
    pub date: String,
    pub temperature: String,
    pub feels_like: String,
    pub temp_min: String,
    pub temp_max: String,
    pub description: String,
    pub icon: String,
    pub detail: ConditionDetail,
}

impl TodaySummary {
    pub fn build(
        today: Option<&ForecastEntry>,
        place: Option<&Place>,
        now: DateTime<Utc>,
    ) -> Self {
        let current = |pick: fn(&ForecastEntry) -> Option<f64>| {
            units::format_celsius(today.and_then(pick).unwrap_or(CURRENT_FALLBACK_KELVIN))
        };
        let condition = today.and_then(ForecastEntry::primary_condition);

        Self {
            weekday: units::weekday_name(local_now(now, place).date_naive()),
            date: today.map(|e| units::header_date(&e.dt_txt)).unwrap_or_default(),
            temperature: current(|e| e.main.temp),
            feels_like: current(|e| e.main.feels_like),
            temp_min: current(|e| e.main.temp_min),
            temp_max: current(|e| e.main.temp_max),
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            detail: ConditionDetail::from_entry(today, place),
        }
    }
}

/// One cell of the hourly strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyItem {
    /// Raw `dt_txt` of the sample.
    pub time: String,
    pub icon: String,
    pub temperature: String,
}

impl HourlyItem {
    pub fn from_entry(entry: &ForecastEntry) -> Self {
        Self {
            time: entry.dt_txt.clone(),
            icon: entry
                .primary_condition()
                .map(|c| c.icon.clone())
                .unwrap_or_default(),
            temperature: units::format_celsius(entry.main.temp.unwrap_or(CURRENT_FALLBACK_KELVIN)),
        }
    }
}

/// One row of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastRow {
    pub icon: String,
    /// `MM월 dd일`
    pub date: String,
    pub day: String,
    pub temperature: String,
    pub feels_like: String,
    pub temp_min: String,
    pub temp_max: String,
    pub description: String,
    pub detail: ConditionDetail,
}

impl ForecastRow {
    pub fn from_entry(entry: &ForecastEntry, place: Option<&Place>) -> Self {
        let row = |value: Option<f64>| units::format_celsius(value.unwrap_or(FORECAST_FALLBACK_KELVIN));
        let condition = entry.primary_condition();

        Self {
            icon: condition
                .map(|c| c.icon.clone())
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| ROW_FALLBACK_ICON.to_string()),
            date: units::date_label(&entry.dt_txt).unwrap_or_else(|| ROW_FALLBACK_DATE.to_string()),
            day: units::weekday_label(&entry.dt_txt)
                .unwrap_or(ROW_FALLBACK_DAY)
                .to_string(),
            temperature: row(entry.main.temp),
            feels_like: row(entry.main.feels_like),
            temp_min: row(entry.main.temp_min),
            temp_max: row(entry.main.temp_max),
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            detail: ConditionDetail::from_entry(Some(entry), place),
        }
    }
}

/// Everything the dashboard renders for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub place: Option<String>,
    pub today: TodaySummary,
    pub strip: Vec<HourlyItem>,
    pub daily: Vec<ForecastRow>,
}

impl DashboardView {
    pub fn build(raw: &RawForecastResponse, now: DateTime<Utc>) -> Self {
        let place = raw.city.as_ref();

        Self {
            place: place.map(|p| {
                if p.country.is_empty() {
                    p.name.clone()
                } else {
                    format!("{}, {}", p.name, p.country)
                }
            }),
            today: TodaySummary::build(select_today(&raw.list), place, now),
            strip: select_today_strip(&raw.list)
                .iter()
                .map(HourlyItem::from_entry)
                .collect(),
            daily: select_daily_forecast(&raw.list)
                .into_iter()
                .map(|entry| ForecastRow::from_entry(entry, place))
                .collect(),
        }
    }
}

fn local_now(now: DateTime<Utc>, place: Option<&Place>) -> DateTime<FixedOffset> {
    let offset = place
        .and_then(|p| FixedOffset::east_opt(p.timezone))
        .unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset)
}
