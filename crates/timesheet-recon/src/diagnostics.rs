//! Non-fatal findings of a run.
//!
//! The engine never logs warnings on its own. Everything worth telling the
//! operator is collected here and handed back with the [`crate::Report`], so
//! callers decide where it goes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A later mapping row repeated a staff id and was dropped.
    DuplicateStaffId { staff_id: String, segment: String },
    /// A cell could not be parsed; the derived value is treated as absent.
    MalformedCell {
        table: String,
        row: usize,
        column: String,
        value: String,
    },
    /// A cell that was not valid UTF-8 and was read with replacement characters.
    InvalidEncoding {
        table: String,
        row: usize,
        column: String,
    },
    /// Secondary entries whose period label could not be parsed. They can still
    /// match on their entry date.
    UnparsedPeriodLabels { count: usize, example: String },
    /// A primary staff id with no mapping row.
    UnresolvedIdentity { staff_id: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::UnresolvedIdentity { .. } => Severity::Info,
            Diagnostic::DuplicateStaffId { .. }
            | Diagnostic::MalformedCell { .. }
            | Diagnostic::InvalidEncoding { .. }
            | Diagnostic::UnparsedPeriodLabels { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateStaffId { staff_id, segment } => write!(
                f,
                "duplicate mapping for staff id {staff_id} in '{segment}', keeping the first"
            ),
            Diagnostic::MalformedCell {
                table,
                row,
                column,
                value,
            } => write!(
                f,
                "{table} row {}: cannot parse {column} value '{value}'",
                row + 1
            ),
            Diagnostic::InvalidEncoding { table, row, column } => write!(
                f,
                "{table} row {}: {column} is not valid UTF-8, undecodable bytes replaced",
                row + 1
            ),
            Diagnostic::UnparsedPeriodLabels { count, example } => write!(
                f,
                "{count} timesheet period label(s) could not be parsed (e.g. '{example}'), \
                 matching those entries by entry date only"
            ),
            Diagnostic::UnresolvedIdentity { staff_id } => {
                write!(f, "no mapping for staff id {staff_id}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_cell_rows_are_one_based() {
        let diagnostic = Diagnostic::MalformedCell {
            table: "primary".into(),
            row: 0,
            column: "TIMEPERIOD".into(),
            value: "soon".into(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "primary row 1: cannot parse TIMEPERIOD value 'soon'"
        );
        assert_eq!(diagnostic.severity(), Severity::Warning);
    }
}
