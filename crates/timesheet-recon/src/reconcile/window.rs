use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::record::SecondaryEntry;

/// The span of secondary activity comparable to one primary timesheet line.
///
/// Starts at midnight of the period start and ends at 23:59:59 of its last day,
/// both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn anchored_at(period_start: NaiveDate, days: u32) -> Option<Window> {
        let last_day = period_start.checked_add_days(Days::new(u64::from(days.checked_sub(1)?)))?;
        Some(Window {
            start: period_start.and_hms_opt(0, 0, 0)?,
            end: last_day.and_hms_opt(23, 59, 59)?,
        })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end.date() && end >= self.start.date()
    }

    /// An entry belongs to the window if its own period overlaps it, or if its
    /// entry date falls inside it. Either is enough.
    pub fn matches(&self, entry: &SecondaryEntry) -> bool {
        let period_overlaps = match (entry.period_start, entry.period_end) {
            (Some(start), Some(end)) => self.overlaps(start, end),
            _ => false,
        };
        period_overlaps || entry.entry_date.is_some_and(|at| self.contains(at))
    }
}

/// Secondary entries grouped by normalized user email.
#[derive(Debug, Default)]
pub struct SecondaryIndex<'a> {
    by_email: HashMap<&'a str, Vec<&'a SecondaryEntry>>,
}

impl<'a> SecondaryIndex<'a> {
    pub fn new(entries: &'a [SecondaryEntry]) -> Self {
        let mut by_email: HashMap<_, Vec<_>> = HashMap::new();
        for entry in entries.iter().filter(|entry| !entry.user_email.is_empty()) {
            by_email
                .entry(entry.user_email.as_str())
                .or_default()
                .push(entry);
        }
        SecondaryIndex { by_email }
    }

    /// Entries of `email_key` (already normalized) inside `window`, in input order.
    pub fn matching(
        &self,
        email_key: &str,
        window: Window,
    ) -> impl Iterator<Item = &'a SecondaryEntry> + '_ {
        self.by_email
            .get(email_key)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |entry| window.matches(entry))
    }
}
