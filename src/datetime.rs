//! `Date:` header parsing.
//!
//! Accepts what `DateTime::parse_from_rfc2822` accepts, and beyond that:
//! * a trailing comment such as `(UTC)`,
//! * a day name that disagrees with the date (it is ignored),
//! * single digit hour / minute / second and two digit years,
//! * a missing or unrecognised zone, which is taken as UTC.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};

pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub fn parse_date_header(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = strip_trailing_comment(value.trim());
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt);
    }
    parse_lenient(strip_day_name(value))
}

/// `6 Oct 2025 14:03:27 [zone]`, fields separated by any whitespace.
fn parse_lenient(value: &str) -> Option<DateTime<FixedOffset>> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let (date, time, zone) = match tokens.as_slice() {
        [day, month, year, time] => ((*day, *month, *year), *time, None),
        [day, month, year, time, zone] => ((*day, *month, *year), *time, Some(*zone)),
        _ => return None,
    };

    let (day, month, year) = date;
    let date = NaiveDate::from_ymd_opt(parse_year(year)?, parse_month(month)?, day.parse().ok()?)?;
    let time = parse_time(time)?;
    let offset = match zone {
        Some(zone) => zone_offset(zone)?,
        None => FixedOffset::east_opt(0)?,
    };
    offset.from_local_datetime(&date.and_time(time)).single()
}

fn strip_day_name(value: &str) -> &str {
    match value.split_once(',') {
        Some((day, rest)) if day.trim().chars().all(|c| c.is_ascii_alphabetic()) => rest.trim(),
        _ => value,
    }
}

fn parse_month(month: &str) -> Option<u32> {
    let month = month.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| month.len() >= 3 && month.starts_with(m))
        .map(|i| i as u32 + 1)
}

fn parse_year(year: &str) -> Option<i32> {
    let parsed: i32 = year.parse().ok()?;
    if year.len() > 2 {
        Some(parsed)
    } else if parsed < 50 {
        Some(parsed + 2000)
    } else {
        Some(parsed + 1900)
    }
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    let mut parts = time.split(':').map(|p| p.parse::<u32>().ok());
    let hour = parts.next()??;
    let minute = parts.next()??;
    let second = parts.next().unwrap_or(Some(0))?;
    if parts.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, second.min(59))
}

/// Numeric offsets and the RFC 822 zone names. Any other alphabetic zone
/// counts as absent, i.e. UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if let Some(digits) = zone.strip_prefix(['+', '-']) {
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        let seconds = hours * 3600 + minutes * 60;
        let sign = if zone.starts_with('-') { -1 } else { 1 };
        return FixedOffset::east_opt(sign * seconds);
    }
    if !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Formats the header in the local zone, or `fallback` when it cannot be
/// parsed.
pub fn local_timestamp(value: &str, fallback: DateTime<Local>) -> String {
    let local = match parse_date_header(value) {
        Some(dt) => dt.with_timezone(&Local),
        None => {
            tracing::debug!("Unparseable Date header {:?}, using current time", value);
            fallback
        }
    };
    local.format(RECORD_DATE_FORMAT).to_string()
}

fn strip_trailing_comment(value: &str) -> &str {
    if value.ends_with(')') {
        if let Some(open) = value.rfind('(') {
            return value[..open].trim_end();
        }
    }
    value
}
