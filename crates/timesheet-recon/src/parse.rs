//! Lenient cell parsing. Every parser returns `None` for empty or malformed
//! input; callers decide whether that deserves a diagnostic.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::Decimal;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Hour cells beyond this are treated as malformed. Sums of in-range values stay
// far from the limits of `Decimal`.
const MAX_HOURS: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

// Slashed dates are day-first, as in "01/05/2025 - 07/05/2025".
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%b-%Y", "%d %b %Y"];

pub fn datetime(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cell, format).ok())
        .or_else(|| date(cell).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

pub fn date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(cell, format).ok())
                .map(|datetime| datetime.date())
        })
}

pub fn decimal(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

pub fn hours(cell: &str) -> Option<Decimal> {
    decimal(cell).filter(|hours| hours.abs() <= MAX_HOURS)
}

/// Parse a free-text period such as `"01/05/2025 - 07/05/2025"`.
pub fn period_label(label: &str) -> Option<(NaiveDate, NaiveDate)> {
    let label = label.trim();
    let dates = |(start, end): (&str, &str)| Some((date(start)?, date(end)?));
    let (start, end) = [" - ", " to ", "–"]
        .into_iter()
        .find_map(|separator| label.split_once(separator))
        .and_then(dates)
        .or_else(|| {
            // "01/05/2025-07/05/2025": try every hyphen until both halves are dates.
            label
                .match_indices('-')
                .find_map(|(at, _)| dates((&label[..at], &label[at + 1..])))
        })?;
    (start <= end).then_some((start, end))
}

/// Staff ids often arrive through a numeric spreadsheet column as `"100.0"`.
pub fn staff_id(cell: &str) -> Option<String> {
    let cell = cell.trim();
    let cell = match cell.strip_suffix(".0") {
        Some(integral) if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) => {
            integral
        }
        _ => cell,
    };
    (!cell.is_empty()).then(|| cell.to_owned())
}

pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_owned())
}
