//! Date formatting for catalog timestamps, in Russian.
//!
//! Inputs come straight from the API and may be null or malformed; every
//! helper degrades to [`PLACEHOLDER`] instead of failing.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

/// Shown in place of a missing or unreadable date.
pub const PLACEHOLDER: &str = "—";

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

const MONTHS_SHORT: [&str; 12] = [
    "янв.", "февр.", "мар.", "апр.", "мая", "июн.", "июл.", "авг.", "сент.", "окт.", "нояб.",
    "дек.",
];

const WEEKDAYS_SHORT: [&str; 7] = ["пн", "вт", "ср", "чт", "пт", "сб", "вс"];

/// Parse `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (taken as UTC).
pub fn parse_date_time(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn parse(input: Option<&str>) -> Option<DateTime<FixedOffset>> {
    input.and_then(parse_date_time)
}

/// Year of a date, e.g. `2020-04-01` → `2020`.
pub fn get_year(date: Option<&str>) -> String {
    parse(date)
        .map(|dt| dt.year().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Long form, e.g. `1 апреля 2020 г.`.
pub fn format_date(date: Option<&str>) -> String {
    let Some(dt) = parse(date) else {
        return PLACEHOLDER.to_string();
    };
    format!(
        "{} {} {} г.",
        dt.day(),
        MONTHS_GENITIVE[dt.month0() as usize],
        dt.year()
    )
}

/// Compact date and time for the next episode, e.g.
/// `ср, 1 апр. 2020 г., 15:30`. Rendered in the timestamp's own offset.
pub fn format_next_episode_date(date: Option<&str>) -> String {
    let Some(dt) = parse(date) else {
        return PLACEHOLDER.to_string();
    };
    format!(
        "{}, {} {} {} г., {:02}:{:02}",
        WEEKDAYS_SHORT[dt.weekday().num_days_from_monday() as usize],
        dt.day(),
        MONTHS_SHORT[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}
