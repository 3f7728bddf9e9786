//! Typed rows derived from the input tables.
//!
//! Derivation is strict about structure and lenient about content: a missing
//! column fails the whole load, while a malformed cell only leaves its derived
//! value empty and records a [`Diagnostic`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::table::Row;
use crate::{Columns, Decimal, Diagnostic, Result, Table, parse};

/// Workflow state of a primary timesheet line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    Approved,
    Posted,
    Open,
    Returned,
    Submitted,
    Other(String),
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => Status::Approved,
            "posted" => Status::Posted,
            "open" => Status::Open,
            "returned" => Status::Returned,
            "submitted" => Status::Submitted,
            _ => Status::Other(value.trim().to_owned()),
        }
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::from(s.to_owned()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Approved => "Approved",
            Status::Posted => "Posted",
            Status::Open => "Open",
            Status::Returned => "Returned",
            Status::Submitted => "Submitted",
            Status::Other(other) => other,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductiveFlag {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryRecord {
    pub resource_id: Option<String>,
    pub resource_name: String,
    pub productive_flag: ProductiveFlag,
    pub status: Status,
    pub period_start: Option<NaiveDate>,
    pub units_consumed: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMapping {
    pub staff_id: String,
    pub email: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryEntry {
    /// Normalized: trimmed and lowercased.
    pub user_email: String,
    pub entry_date: Option<NaiveDateTime>,
    pub period_label: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub billable_hours: Option<Decimal>,
}

struct CellReader<'a> {
    table: &'a Table,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl CellReader<'_> {
    fn parsed<T>(
        &mut self,
        row: Row<'_>,
        column: (usize, &str),
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let value = row.get(column.0);
        let parsed = parse(value);
        if parsed.is_none() && !value.trim().is_empty() {
            self.diagnostics.push(Diagnostic::MalformedCell {
                table: self.table.name().to_owned(),
                row: row.index,
                column: column.1.to_owned(),
                value: value.to_owned(),
            });
        }
        parsed
    }
}

impl PrimaryRecord {
    pub fn from_table(
        table: &Table,
        columns: &Columns,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<PrimaryRecord>> {
        let resource_id = table.column(&columns.resource_id)?;
        let resource_name = table.column(&columns.resource_name)?;
        let productive_flag = (
            table.column(&columns.productive_flag)?,
            columns.productive_flag.as_str(),
        );
        let status = table.column(&columns.status)?;
        let time_period = (table.column(&columns.time_period)?, columns.time_period.as_str());
        let units_consumed = (
            table.column(&columns.units_consumed)?,
            columns.units_consumed.as_str(),
        );

        let mut cells = CellReader {
            table,
            diagnostics: &mut *diagnostics,
        };
        let records = table
            .rows()
            .map(|row| PrimaryRecord {
                resource_id: parse::staff_id(row.get(resource_id)),
                resource_name: row.get(resource_name).trim().to_owned(),
                productive_flag: cells
                    .parsed(row, productive_flag, parse_productive_flag)
                    .unwrap_or(ProductiveFlag::No),
                status: Status::from(row.get(status).to_owned()),
                period_start: cells.parsed(row, time_period, parse::date),
                units_consumed: cells.parsed(row, units_consumed, parse::hours),
            })
            .collect();
        Ok(records)
    }
}

fn parse_productive_flag(cell: &str) -> Option<ProductiveFlag> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(ProductiveFlag::Yes),
        "no" | "n" => Some(ProductiveFlag::No),
        _ => None,
    }
}

impl IdentityMapping {
    /// Mapping rows without a staff id cannot be looked up and are skipped.
    pub fn from_table(
        table: &Table,
        columns: &Columns,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<IdentityMapping>> {
        let staff_id = (table.column(&columns.staff_id)?, columns.staff_id.as_str());
        let email = table.column(&columns.email)?;
        let owner = table.column(&columns.owner)?;

        let mut cells = CellReader {
            table,
            diagnostics: &mut *diagnostics,
        };
        let mappings = table
            .rows()
            .filter_map(|row| {
                let staff_id = cells.parsed(row, staff_id, parse::staff_id)?;
                Some(IdentityMapping {
                    staff_id,
                    email: parse::text(row.get(email)),
                    owner: parse::text(row.get(owner)),
                })
            })
            .collect();
        Ok(mappings)
    }
}

impl SecondaryEntry {
    pub fn from_table(
        table: &Table,
        columns: &Columns,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<SecondaryEntry>> {
        let user_email = table.column(&columns.user_email)?;
        let entry_date = (table.column(&columns.entry_date)?, columns.entry_date.as_str());
        let timesheet_period = table.column(&columns.timesheet_period)?;
        let billable_hours = (
            table.column(&columns.billable_hours)?,
            columns.billable_hours.as_str(),
        );

        let mut unparsed_labels = 0;
        let mut example_label = None;

        let mut cells = CellReader {
            table,
            diagnostics: &mut *diagnostics,
        };
        let mut entries = Vec::with_capacity(table.len());
        for row in table.rows() {
            let period_label = row.get(timesheet_period).trim().to_owned();
            let period = parse::period_label(&period_label);
            if period.is_none() && !period_label.is_empty() {
                unparsed_labels += 1;
                example_label.get_or_insert_with(|| period_label.clone());
            }

            entries.push(SecondaryEntry {
                user_email: parse::email_key(row.get(user_email)),
                entry_date: cells.parsed(row, entry_date, parse::datetime),
                period_label,
                period_start: period.map(|(start, _)| start),
                period_end: period.map(|(_, end)| end),
                billable_hours: cells.parsed(row, billable_hours, parse::hours),
            });
        }

        if let Some(example) = example_label {
            diagnostics.push(Diagnostic::UnparsedPeriodLabels {
                count: unparsed_labels,
                example,
            });
        }
        Ok(entries)
    }
}
