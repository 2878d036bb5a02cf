//! Clock arithmetic for the planning grid.
//!
//! Everything here works in "minutes since local midnight" and is free of
//! side effects, so the grid, the forms and the totals all share one
//! definition of what a quarter hour is.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 1440;
pub const QUARTER_HOUR: u32 = 15;
pub const DAYS_PER_WEEK: u8 = 7;

const DAY_NAMES: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];
const SHORT_DAY_NAMES: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

/// Returned when a string is not a valid `HH:MM` clock time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid time '{input}', expected HH:MM")]
pub struct TimeFormatError {
    pub input: String,
}

/// Format minutes since midnight as `HH:MM`.
///
/// Values past the end of the day wrap modulo 1440, so `1440` renders as
/// `00:00` rather than `24:00`.
pub fn minutes_to_time(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse an `HH:MM` (or `H:MM`) clock time into minutes since midnight.
///
/// Accepts hours 0-23 written with one or two digits and exactly two minute
/// digits in 00-59.
pub fn time_to_minutes(value: &str) -> Result<u32, TimeFormatError> {
    let error = || TimeFormatError {
        input: value.to_string(),
    };

    let (hours, minutes) = value.split_once(':').ok_or_else(error)?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
        return Err(error());
    }
    if !all_digits(hours) || !all_digits(minutes) {
        return Err(error());
    }

    let hours: u32 = hours.parse().map_err(|_| error())?;
    let minutes: u32 = minutes.parse().map_err(|_| error())?;
    if hours > 23 || minutes > 59 {
        return Err(error());
    }

    Ok(hours * 60 + minutes)
}

/// Round to the nearest quarter hour, halves rounding up.
pub fn snap_to_quarter_hour(minutes: u32) -> u32 {
    (minutes + QUARTER_HOUR / 2) / QUARTER_HOUR * QUARTER_HOUR
}

/// Round down to the quarter hour containing `minutes`.
pub fn floor_to_quarter_hour(minutes: u32) -> u32 {
    minutes / QUARTER_HOUR * QUARTER_HOUR
}

/// One horizontal line of the planning grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMark {
    pub hour: u32,
    pub minute: u32,
    pub label: String,
    pub total_minutes: u32,
}

impl TimeMark {
    pub fn is_full_hour(&self) -> bool {
        self.minute == 0
    }
}

/// Quarter-hour marks between two hours. Clone the value to iterate again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlots {
    next: u32,
    end: u32,
}

impl Iterator for TimeSlots {
    type Item = TimeMark;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let total_minutes = self.next;
        self.next += QUARTER_HOUR;
        Some(TimeMark {
            hour: total_minutes / 60,
            minute: total_minutes % 60,
            label: minutes_to_time(total_minutes),
            total_minutes,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end.saturating_sub(self.next) / QUARTER_HOUR) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TimeSlots {}

/// Quarter-hour rows from `start_hour:00` up to, but not including,
/// `end_hour:00`. `generate_time_slots(9, 10)` yields 09:00, 09:15, 09:30
/// and 09:45.
pub fn generate_time_slots(start_hour: u32, end_hour: u32) -> TimeSlots {
    let end_hour = end_hour.min(24);
    TimeSlots {
        next: start_hour.min(end_hour) * 60,
        end: end_hour * 60,
    }
}

/// Layout box of a slot inside the grid, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPosition {
    pub top: f64,
    pub height: f64,
}

pub fn get_slot_position(
    start_minute: u32,
    duration_minute: u32,
    grid_start_hour: u32,
    pixels_per_hour: f64,
) -> SlotPosition {
    let offset = start_minute as f64 - (grid_start_hour * 60) as f64;
    SlotPosition {
        top: offset / 60.0 * pixels_per_hour,
        height: duration_minute as f64 / 60.0 * pixels_per_hour,
    }
}

/// Inverse of [`get_slot_position`]: the quarter-hour row under a vertical
/// pixel offset. Negative offsets land on the first row.
pub fn pixel_to_minute(y: f64, grid_start_hour: u32, pixels_per_hour: f64) -> u32 {
    if pixels_per_hour <= 0.0 || !y.is_finite() {
        return grid_start_hour * 60;
    }
    let offset = (y.max(0.0) / pixels_per_hour * 60.0).floor() as u32;
    floor_to_quarter_hour(grid_start_hour * 60 + offset)
}

/// Short human duration: `30min`, `1h`, `1h30`, `2h`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, rest) => format!("{}min", rest),
        (hours, 0) => format!("{}h", hours),
        (hours, rest) => format!("{}h{:02}", hours, rest),
    }
}

/// Decimal hours with one digit, for totals (`7.5h`).
pub fn format_hours(minutes: u32) -> String {
    format!("{:.1}h", minutes as f64 / 60.0)
}

pub fn minutes_to_hours(minutes: u32) -> f64 {
    minutes as f64 / 60.0
}

/// Monday-first day label
pub fn day_name(day_index: u8) -> &'static str {
    DAY_NAMES.get(day_index as usize).copied().unwrap_or("?")
}

pub fn short_day_name(day_index: u8) -> &'static str {
    SHORT_DAY_NAMES.get(day_index as usize).copied().unwrap_or("?")
}

pub fn is_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// The Monday of the week containing `date`
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven dates of the week starting at `week_start`
pub fn week_dates(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..DAYS_PER_WEEK as i64)
        .map(|offset| week_start + Duration::days(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_to_time_known_values() {
        assert_eq!(minutes_to_time(0), "00:00");
        assert_eq!(minutes_to_time(540), "09:00");
        assert_eq!(minutes_to_time(1439), "23:59");
        assert_eq!(minutes_to_time(75), "01:15");
    }

    #[test]
    fn test_minutes_to_time_wraps_past_midnight() {
        assert_eq!(minutes_to_time(1440), "00:00");
        assert_eq!(minutes_to_time(1500), "01:00");
    }

    #[test]
    fn test_time_round_trip_whole_day() {
        for m in 0..MINUTES_PER_DAY {
            assert_eq!(time_to_minutes(&minutes_to_time(m)).unwrap(), m);
        }
    }

    #[test]
    fn test_time_to_minutes_accepts_single_digit_hour() {
        assert_eq!(time_to_minutes("9:30").unwrap(), 570);
        assert_eq!(time_to_minutes("23:00").unwrap(), 1380);
    }

    #[test]
    fn test_time_to_minutes_rejects_bad_input() {
        for bad in ["", "24:00", "9:5", "09:60", "0900", "ab:cd", "-1:00", "09:00 ", "123:00", "09:1a"] {
            let err = time_to_minutes(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn test_snap_to_quarter_hour_rounds_half_up() {
        assert_eq!(snap_to_quarter_hour(0), 0);
        assert_eq!(snap_to_quarter_hour(7), 0);
        assert_eq!(snap_to_quarter_hour(8), 15);
        assert_eq!(snap_to_quarter_hour(22), 15);
        assert_eq!(snap_to_quarter_hour(23), 30);
        assert_eq!(snap_to_quarter_hour(540), 540);
    }

    #[test]
    fn test_generate_time_slots_one_hour() {
        let marks: Vec<TimeMark> = generate_time_slots(9, 10).collect();
        let labels: Vec<&str> = marks.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["09:00", "09:15", "09:30", "09:45"]);
        let totals: Vec<u32> = marks.iter().map(|m| m.total_minutes).collect();
        assert_eq!(totals, vec![540, 555, 570, 585]);
        assert!(marks[0].is_full_hour());
        assert_eq!(marks[3].hour, 9);
        assert_eq!(marks[3].minute, 45);
    }

    #[test]
    fn test_generate_time_slots_is_restartable() {
        let slots = generate_time_slots(6, 22);
        assert_eq!(slots.len(), 64);
        let first: Vec<_> = slots.clone().collect();
        let second: Vec<_> = slots.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_time_slots_empty_when_reversed() {
        assert_eq!(generate_time_slots(10, 9).count(), 0);
    }

    #[test]
    fn test_slot_position_and_inverse() {
        let pos = get_slot_position(600, 90, 6, 64.0);
        assert_eq!(pos.top, 256.0);
        assert_eq!(pos.height, 96.0);

        assert_eq!(pixel_to_minute(256.0, 6, 64.0), 600);
        assert_eq!(pixel_to_minute(270.0, 6, 64.0), 600);
        assert_eq!(pixel_to_minute(-20.0, 6, 64.0), 360);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30min");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(90), "1h30");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(65), "1h05");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(450), "7.5h");
        assert_eq!(format_hours(0), "0.0h");
    }

    #[test]
    fn test_day_names() {
        assert_eq!(day_name(0), "Lundi");
        assert_eq!(day_name(6), "Dimanche");
        assert_eq!(day_name(7), "?");
        assert_eq!(short_day_name(2), "Mer");
    }

    #[test]
    fn test_week_start_for() {
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(week_start_for(saturday), monday);
        assert_eq!(week_start_for(monday), monday);
        assert!(is_monday(monday));
        assert!(!is_monday(saturday));

        let dates = week_dates(monday);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    }
}
