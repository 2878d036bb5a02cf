use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use shared::time_utils::{short_day_name, week_start_for};

/// Current instant from the browser clock
pub fn now_utc() -> DateTime<Utc> {
    let millis = js_sys::Date::now() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Today's date in the browser's local time zone
pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1, // JavaScript months are 0-indexed
        now.get_date(),
    )
    .unwrap_or_else(|| now_utc().date_naive())
}

/// Monday of the current week
pub fn current_week_start() -> NaiveDate {
    week_start_for(today())
}

/// Value for an `<input type="date">`
pub fn to_input_value(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_input_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// "du 12/10 au 18/10/2026"
pub fn format_week_range(week_start: NaiveDate) -> String {
    let end = week_start + Duration::days(6);
    format!(
        "du {} au {}",
        week_start.format("%d/%m"),
        end.format("%d/%m/%Y")
    )
}

/// Column header such as "Mar 13/10"
pub fn day_header(day_index: u8, week_start: Option<NaiveDate>) -> String {
    match week_start {
        Some(start) => {
            let date = start + Duration::days(day_index as i64);
            format!("{} {:02}/{:02}", short_day_name(day_index), date.day(), date.month())
        }
        None => short_day_name(day_index).to_string(),
    }
}

/// Human form of an RFC 3339 timestamp, e.g. "17/10/2026 14:05"; the input
/// is returned unchanged when it cannot be parsed
pub fn format_timestamp(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}
