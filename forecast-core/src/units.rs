//! Display conversions for upstream units.
//!
//! All functions are total: missing inputs are resolved through the fallback
//! constants below before conversion, never propagated into the output.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Substitute for a missing temperature on "current" (today) fields, 25℃.
pub const CURRENT_FALLBACK_KELVIN: f64 = 298.15;

/// Substitute for a missing temperature on forecast-row fields, 0℃.
pub const FORECAST_FALLBACK_KELVIN: f64 = 273.15;

pub const DEFAULT_WIND_SPEED_MPS: f64 = 0.0;
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

const KELVIN_OFFSET: f64 = 273.15;
const MPS_TO_KMH: f64 = 3.6;

pub const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Weekday names indexed from Sunday.
pub const WEEKDAYS_KO: [&str; 7] = [
    "일요일", "월요일", "화요일", "수요일", "목요일", "금요일", "토요일",
];

/// Kelvin to whole degrees Celsius, rounded to nearest with halves rounding up.
pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    (kelvin - KELVIN_OFFSET + 0.5).floor() as i64
}

/// `"25℃"`
pub fn format_celsius(kelvin: f64) -> String {
    format!("{}℃", kelvin_to_celsius(kelvin))
}

/// `"10km"`, rounded to the nearest kilometer.
pub fn meters_to_kilometers(meters: f64) -> String {
    format!("{}km", (meters / 1000.0).round() as i64)
}

/// `"4.5km/h"`, one decimal place.
pub fn convert_wind_speed(meters_per_second: f64) -> String {
    format!("{:.1}km/h", meters_per_second * MPS_TO_KMH)
}

/// Unix seconds to a local `H:mm` clock time at the given UTC offset.
///
/// Out-of-range offsets fall back to UTC and out-of-range timestamps to the epoch.
pub fn unix_to_clock(unix_seconds: i64, utc_offset_seconds: i32) -> String {
    let offset = FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .format("%-H:%M")
        .to_string()
}

pub fn parse_dt_txt(dt_txt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(dt_txt.trim(), DT_TXT_FORMAT).ok()
}

/// `"2024-07-13 03:00:00"` to `"07월 13일"`.
pub fn date_label(dt_txt: &str) -> Option<String> {
    parse_dt_txt(dt_txt).map(|dt| dt.format("%m월 %d일").to_string())
}

/// Korean weekday name of the entry's local date.
pub fn weekday_label(dt_txt: &str) -> Option<&'static str> {
    parse_dt_txt(dt_txt).map(|dt| weekday_name(dt.date()))
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAYS_KO[date.weekday().num_days_from_sunday() as usize]
}

/// `"2024-07-13 03:00:00"` to `"2024.07.13"`; empty when the date part is unreadable.
pub fn header_date(dt_txt: &str) -> String {
    let date_part = dt_txt.split(' ').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(|date| date.format("%Y.%m.%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_reference_points() {
        assert_eq!(kelvin_to_celsius(298.15), 25);
        assert_eq!(kelvin_to_celsius(273.15), 0);
        assert_eq!(kelvin_to_celsius(0.0), -273);
    }

    #[test]
    fn kelvin_rounds_to_nearest() {
        assert_eq!(format_celsius(304.64), "31℃");
        assert_eq!(format_celsius(307.28), "34℃");
        assert_eq!(format_celsius(306.5), "33℃");
        assert_eq!(format_celsius(CURRENT_FALLBACK_KELVIN), "25℃");
        assert_eq!(format_celsius(FORECAST_FALLBACK_KELVIN), "0℃");
    }

    #[test]
    fn kelvin_halves_round_up() {
        assert_eq!(format_celsius(273.65), "1℃");
        assert_eq!(format_celsius(272.65), "0℃");
        assert_eq!(format_celsius(270.65), "-2℃");
    }

    #[test]
    fn wind_speed_one_decimal() {
        assert_eq!(convert_wind_speed(1.24), "4.5km/h");
        assert_eq!(convert_wind_speed(0.0), "0.0km/h");
        assert_eq!(convert_wind_speed(3.12), "11.2km/h");
    }

    #[test]
    fn visibility_whole_kilometers() {
        assert_eq!(meters_to_kilometers(10_000.0), "10km");
        assert_eq!(meters_to_kilometers(0.0), "0km");
        assert_eq!(meters_to_kilometers(400.0), "0km");
        assert_eq!(meters_to_kilometers(999.0), "1km");
    }

    #[test]
    fn clock_time_uses_place_offset() {
        assert_eq!(unix_to_clock(1720815668, 32400), "5:21");
        assert_eq!(unix_to_clock(1720868047, 32400), "19:54");
        assert_eq!(unix_to_clock(0, 0), "0:00");
    }

    #[test]
    fn invalid_offset_falls_back_to_utc() {
        assert_eq!(unix_to_clock(3600, i32::MAX), "1:00");
    }

    #[test]
    fn date_labels_from_dt_txt() {
        assert_eq!(date_label("2024-07-13 03:00:00").as_deref(), Some("07월 13일"));
        assert_eq!(weekday_label("2024-07-13 03:00:00"), Some("토요일"));
        assert_eq!(weekday_label("2024-07-14 00:00:00"), Some("일요일"));
        assert_eq!(header_date("2024-07-13 03:00:00"), "2024.07.13");
    }

    #[test]
    fn unreadable_timestamps_yield_nothing() {
        assert_eq!(date_label("not a date"), None);
        assert_eq!(weekday_label(""), None);
        assert_eq!(header_date(""), "");
    }
}
