//! Plain-text rendering of a [`DashboardView`].

use std::fmt::{self, Write};

use forecast_core::{
    DashboardView, ForecastRow, HourlyItem, TodaySummary, transform::ConditionDetail,
};

pub fn render_dashboard(view: &DashboardView) -> String {
    DashboardText(view).to_string()
}

struct DashboardText<'a>(&'a DashboardView);

impl fmt::Display for DashboardText<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        if let Some(place) = &view.place {
            writeln!(out, "📍 {place}\n")?;
        }

        render_today(out, &view.today)?;
        render_strip(out, &view.strip)?;
        render_daily(out, &view.daily)
    }
}

fn render_today(out: &mut fmt::Formatter<'_>, today: &TodaySummary) -> fmt::Result {
    writeln!(out, "{} ({})", today.weekday, today.date)?;
    writeln!(out, "  {}", today.temperature)?;
    writeln!(out, "  체감온도 {}", today.feels_like)?;
    writeln!(out, "  {}↓ {}↑", today.temp_min, today.temp_max)?;
    if !today.description.is_empty() {
        writeln!(out, "  {} [{}]", today.description, today.icon)?;
    }
    render_detail(out, &today.detail, "  ")?;
    out.write_char('\n')
}

fn render_strip(out: &mut fmt::Formatter<'_>, strip: &[HourlyItem]) -> fmt::Result {
    if strip.is_empty() {
        return Ok(());
    }

    writeln!(out, "시간별")?;
    for item in strip {
        writeln!(out, "  {}  {:>4}  {}", item.time, item.icon, item.temperature)?;
    }
    out.write_char('\n')
}

fn render_daily(out: &mut fmt::Formatter<'_>, rows: &[ForecastRow]) -> fmt::Result {
    writeln!(out, "일기예보 (자정기준)")?;
    if rows.is_empty() {
        return writeln!(out, "  -");
    }

    for row in rows {
        writeln!(
            out,
            "  {} {} [{}] {} (체감온도 {}) {}",
            row.date, row.day, row.icon, row.temperature, row.feels_like, row.description
        )?;
        render_detail(out, &row.detail, "    ")?;
    }
    Ok(())
}

fn render_detail(
    out: &mut fmt::Formatter<'_>,
    detail: &ConditionDetail,
    indent: &str,
) -> fmt::Result {
    writeln!(
        out,
        "{indent}가시거리 {} · 습도 {} · 풍속 {} · 기압 {}",
        detail.visibility, detail.humidity, detail.wind_speed, detail.air_pressure
    )?;
    writeln!(out, "{indent}일출 {} · 일몰 {}", detail.sunrise, detail.sunset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::RawForecastResponse;

    #[test]
    fn empty_forecast_renders_fallbacks() {
        let view = DashboardView::build(&RawForecastResponse::default(), chrono::Utc::now());
        let text = render_dashboard(&view);

        assert!(text.contains("25℃"));
        assert!(text.contains("가시거리 10km"));
        assert!(text.contains("풍속 0.0km/h"));
        assert!(text.contains("일기예보 (자정기준)\n  -"));
        assert!(!text.contains("시간별"));
    }

    #[test]
    fn place_header_is_first_line() {
        let raw: RawForecastResponse = serde_json::from_str(
            r#"{"cod":"200","message":0,"cnt":0,"list":[],"city":{"name":"Seoul","country":"KR"}}"#,
        )
        .unwrap();
        let text = render_dashboard(&DashboardView::build(&raw, chrono::Utc::now()));

        assert!(text.starts_with("📍 Seoul, KR"));
    }

    #[test]
    fn midnight_row_is_listed_with_its_detail() {
        let raw: RawForecastResponse = serde_json::from_str(
            r#"{"cod":"200","list":[{"dt":1720828800,"dt_txt":"2024-07-13 00:00:00",
                "main":{"temp":295.3,"feels_like":295.3,"humidity":80,"pressure":1004},
                "weather":[{"id":500,"main":"Rain","description":"light rain","icon":"10n"}],
                "wind":{"speed":2.5,"deg":90}}]}"#,
        )
        .unwrap();
        let text = render_dashboard(&DashboardView::build(&raw, chrono::Utc::now()));

        let daily = text.split("일기예보 (자정기준)\n").nth(1).unwrap();
        let mut lines = daily.lines();
        assert_eq!(
            lines.next(),
            Some("  07월 13일 토요일 [10n] 22℃ (체감온도 22℃) light rain")
        );
        assert!(lines.next().unwrap().starts_with("    가시거리 10km · 습도 80% · 풍속 9.0km/h"));
    }
}
