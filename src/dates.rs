use chrono::{Duration, Local, NaiveDate};
use std::env;

/// Canonical key for one local calendar day: `YYYY-MM-DD`. Lexicographic
/// order on keys matches chronological order.
pub fn canonical_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// User-facing `DD/MM/YYYY`. Leaves unparseable input as-is.
pub fn display_key(key: &str) -> String {
    match parse_key(key) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => key.to_string(),
    }
}

/// Every day from `start` to `end` inclusive, ascending. Empty when
/// `start > end` or either key is invalid.
pub fn sequence(start: &str, end: &str) -> Vec<String> {
    let (Some(mut day), Some(end)) = (parse_key(start), parse_key(end)) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    while day <= end {
        out.push(canonical_key(day));
        day += Duration::days(1);
    }
    out
}

/// Today in the local calendar. `APP_TODAY` (canonical key) overrides the
/// wall clock so tests and demos can pin the day.
pub fn current_day() -> NaiveDate {
    if let Ok(value) = env::var("APP_TODAY") {
        if let Some(date) = parse_key(&value) {
            return date;
        }
    }
    Local::now().date_naive()
}
