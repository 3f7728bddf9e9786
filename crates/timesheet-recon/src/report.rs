//! Result rows, the discrepancy summary and their tabular rendering.

use std::io::Write;

use chrono::NaiveDate;

use crate::record::Status;
use crate::{Decimal, Diagnostic};

pub const RECONCILIATION_TABLE: &str = "Reconciliation";
pub const FLAGGED_TABLE: &str = "Flagged";

/// One reconciled primary timesheet line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRow {
    pub name: String,
    pub staff_id: Option<String>,
    pub email: Option<String>,
    pub owner: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub primary_hours: Decimal,
    pub secondary_hours: Decimal,
    /// `primary_hours - secondary_hours`, unrounded.
    pub discrepancy: Decimal,
}

impl ReconciliationRow {
    pub fn is_discrepant(&self, tolerance: Decimal) -> bool {
        self.discrepancy.abs() > tolerance
    }
}

/// One primary timesheet line that is not yet in a reconcilable state.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedRow {
    pub name: String,
    pub staff_id: Option<String>,
    pub email: Option<String>,
    pub owner: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub primary_hours: Decimal,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub reconciled_rows: usize,
    pub discrepant_rows: usize,
    pub primary_hours: Decimal,
    pub secondary_hours: Decimal,
    pub flagged_rows: usize,
    pub unresolved_identities: usize,
    pub unparsed_period_labels: usize,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub reconciliation: Vec<ReconciliationRow>,
    pub flagged: Vec<FlaggedRow>,
    pub diagnostics: Vec<Diagnostic>,
    pub tolerance: Decimal,
}

impl Report {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            reconciled_rows: self.reconciliation.len(),
            flagged_rows: self.flagged.len(),
            ..Summary::default()
        };
        for row in &self.reconciliation {
            summary.primary_hours += row.primary_hours;
            summary.secondary_hours += row.secondary_hours;
            if row.is_discrepant(self.tolerance) {
                summary.discrepant_rows += 1;
            }
        }
        for diagnostic in &self.diagnostics {
            match diagnostic {
                Diagnostic::UnresolvedIdentity { .. } => summary.unresolved_identities += 1,
                Diagnostic::UnparsedPeriodLabels { count, .. } => {
                    summary.unparsed_period_labels += count
                }
                _ => {}
            }
        }
        summary
    }

    pub fn discrepancies(&self) -> impl Iterator<Item = &ReconciliationRow> {
        self.reconciliation
            .iter()
            .filter(move |row| row.is_discrepant(self.tolerance))
    }

    pub fn reconciliation_table(&self) -> OutputTable {
        OutputTable {
            name: RECONCILIATION_TABLE,
            headers: &[
                "Name",
                "Staff ID",
                "Email",
                "Owner",
                "Timesheet Period",
                "Primary Hrs",
                "Secondary Hrs",
                "Discrepancy",
            ],
            hour_columns: &["Primary Hrs", "Secondary Hrs", "Discrepancy"],
            rows: self
                .reconciliation
                .iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        optional(&row.staff_id),
                        optional(&row.email),
                        optional(&row.owner),
                        date(row.period_start),
                        hours(row.primary_hours),
                        hours(row.secondary_hours),
                        hours(row.discrepancy),
                    ]
                })
                .collect(),
        }
    }

    pub fn flagged_table(&self) -> OutputTable {
        OutputTable {
            name: FLAGGED_TABLE,
            headers: &[
                "Name",
                "Staff ID",
                "Email",
                "Owner",
                "Timesheet Period",
                "Primary Hrs",
                "Status",
            ],
            hour_columns: &["Primary Hrs"],
            rows: self
                .flagged
                .iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        optional(&row.staff_id),
                        optional(&row.email),
                        optional(&row.owner),
                        date(row.period_start),
                        hours(row.primary_hours),
                        row.status.to_string(),
                    ]
                })
                .collect(),
        }
    }

    pub fn tables(&self) -> [OutputTable; 2] {
        [self.reconciliation_table(), self.flagged_table()]
    }
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn hours(value: Decimal) -> String {
    value.normalize().to_string()
}

/// A rendered output table with a fixed column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    /// Headers of the columns holding decimal hours.
    pub hour_columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn is_hours_column(&self, column: usize) -> bool {
        self.headers
            .get(column)
            .is_some_and(|header| self.hour_columns.contains(header))
    }

    pub fn write_csv(&self, writer: impl Write) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> csv::Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_report() -> Report {
        Report {
            reconciliation: vec![
                ReconciliationRow {
                    name: "Jane Doe".to_owned(),
                    staff_id: Some("100".to_owned()),
                    email: Some("jane@x.com".to_owned()),
                    owner: Some("Retail, UK".to_owned()),
                    period_start: NaiveDate::from_ymd_opt(2025, 5, 5),
                    primary_hours: dec!(40.0),
                    secondary_hours: dec!(39.995),
                    discrepancy: dec!(0.005),
                },
                ReconciliationRow {
                    name: "John Roe".to_owned(),
                    staff_id: Some("101".to_owned()),
                    email: None,
                    owner: None,
                    period_start: NaiveDate::from_ymd_opt(2025, 5, 5),
                    primary_hours: dec!(40),
                    secondary_hours: dec!(0),
                    discrepancy: dec!(40),
                },
            ],
            flagged: vec![FlaggedRow {
                name: "Ann Poe".to_owned(),
                staff_id: Some("102".to_owned()),
                email: Some("ann@x.com".to_owned()),
                owner: Some("Wealth".to_owned()),
                period_start: NaiveDate::from_ymd_opt(2025, 5, 12),
                primary_hours: dec!(37.50),
                status: Status::Submitted,
            }],
            diagnostics: vec![Diagnostic::UnresolvedIdentity {
                staff_id: "101".to_owned(),
            }],
            tolerance: dec!(0.01),
        }
    }

    #[test]
    fn summary_counts_only_real_discrepancies() {
        let summary = sample_report().summary();

        assert_eq!(
            summary,
            Summary {
                reconciled_rows: 2,
                discrepant_rows: 1,
                primary_hours: dec!(80),
                secondary_hours: dec!(39.995),
                flagged_rows: 1,
                unresolved_identities: 1,
                unparsed_period_labels: 0,
            }
        );
    }

    #[test]
    fn render_reconciliation_table() {
        let csv = sample_report().reconciliation_table().to_csv_string().unwrap();

        insta::assert_snapshot!(csv, @r#"
        Name,Staff ID,Email,Owner,Timesheet Period,Primary Hrs,Secondary Hrs,Discrepancy
        Jane Doe,100,jane@x.com,"Retail, UK",2025-05-05,40,39.995,0.005
        John Roe,101,,,2025-05-05,40,0,40
        "#);
    }

    #[test]
    fn hour_columns_by_position() {
        let table = sample_report().flagged_table();
        let hours: Vec<_> = (0..table.headers.len())
            .filter(|&column| table.is_hours_column(column))
            .collect();
        assert_eq!(hours, [5]);
    }

    #[test]
    fn render_flagged_table() {
        let csv = sample_report().flagged_table().to_csv_string().unwrap();

        insta::assert_snapshot!(csv, @"
        Name,Staff ID,Email,Owner,Timesheet Period,Primary Hrs,Status
        Ann Poe,102,ann@x.com,Wealth,2025-05-12,37.5,Submitted
        ");
    }
}
