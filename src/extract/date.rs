use chrono::{Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::VENUE_UNDECIDED;

/// Matches localized calendar dates like 2025年9月9日. A parenthesized
/// weekday may follow in the source text and is ignored.
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap());

/// Matches venue names in bracket delimiters like 【東京国際フォーラム】.
static VENUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"【([^】]+)】").unwrap());

/// Extract the first date token from `text` and render it as the canonical
/// instant: local midnight of that calendar day, serialized in UTC with
/// millisecond precision. The fixed format keeps lexicographic order equal
/// to chronological order across the persisted collection.
///
/// Returns `None` when no date token is present or the captured numbers do
/// not form a valid calendar date.
pub fn parse_concert_date(text: &str) -> Option<String> {
    let caps = DATE_RE.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;

    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let local = Local.from_local_datetime(&midnight).earliest()?;
    Some(
        local
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Extract the bracketed venue name from `text`. When no bracket pair is
/// present the venue is recorded as undecided rather than failing the item.
pub fn parse_venue(text: &str) -> String {
    VENUE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|venue| !venue.is_empty())
        .unwrap_or_else(|| VENUE_UNDECIDED.to_string())
}
