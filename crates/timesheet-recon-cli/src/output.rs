use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;
use timesheet_recon::Report;
use timesheet_recon::report::OutputTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One workbook with a sheet per table
    #[default]
    Xlsx,
    /// One CSV file per table
    Csv,
}

pub fn write_report(
    report: &Report,
    output_dir: &Path,
    timestamp: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    match format {
        OutputFormat::Xlsx => write_workbook(report, output_dir, timestamp).map(|path| vec![path]),
        OutputFormat::Csv => write_tables(report, output_dir, timestamp),
    }
}

/// Write both tables as sheets of one workbook with fitted column widths.
fn write_workbook(report: &Report, output_dir: &Path, timestamp: &str) -> Result<PathBuf> {
    let path = output_dir.join(format!("Timesheet_Reconciliation_{timestamp}.xlsx"));
    let header_format = Format::new().set_bold();

    let mut workbook = Workbook::new();
    for table in report.tables() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.name)?;
        for (column, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, u16::try_from(column)?, *header, &header_format)?;
        }
        for (index, cells) in table.rows.iter().enumerate() {
            let row = u32::try_from(index + 1)?;
            for (column, cell) in cells.iter().enumerate() {
                write_cell(worksheet, &table, row, column, cell)?;
            }
        }
        worksheet.autofit();
    }

    workbook
        .save(&path)
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    Ok(path)
}

fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    table: &OutputTable,
    row: u32,
    column: usize,
    cell: &str,
) -> Result<()> {
    let col = u16::try_from(column)?;
    // Hours go in as numbers so the sheet can sum them; empty cells stay blank.
    match cell.parse::<f64>() {
        Ok(hours) if table.is_hours_column(column) => {
            worksheet.write_number(row, col, hours)?;
        }
        _ if cell.is_empty() => {}
        _ => {
            worksheet.write_string(row, col, cell)?;
        }
    }
    Ok(())
}

/// Write one CSV file per output table, all sharing the run's timestamp.
fn write_tables(report: &Report, output_dir: &Path, timestamp: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for table in report.tables() {
        let file_name = format!(
            "Timesheet_Reconciliation_{timestamp}_{}.csv",
            table.name.to_lowercase()
        );
        let path = output_dir.join(file_name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        table
            .write_csv(file)
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use timesheet_recon::{InputTables, ReconcileConfig, Table};

    fn table(name: &str, source: &str) -> Table {
        Table::from_csv_reader(name, source.as_bytes()).unwrap()
    }

    fn sample_report() -> Report {
        let tables = InputTables {
            primary: table(
                "primary",
                "RESOURCEID,RESOURCE_NAME,PROJECT_PRODUCTIVE_FLAG,TSSTATUS,TIMEPERIOD,UNITS_CONSUMED\n\
                 100,Jane Doe,Yes,Approved,2025-05-05,40\n\
                 101,John Roe,Yes,Open,2025-05-05,40\n",
            ),
            mapping_active: table(
                "Offshore Active",
                "PS ID,CG Email Id,P&L Owner new\n100,jane@x.com,Retail\n",
            ),
            mapping_inactive: table("Offshore Inactive", "PS ID,CG Email Id,P&L Owner new\n"),
            secondary: table(
                "secondary",
                "User Email,Entry Date,Timesheet Period,Actual Billable Hours (Selected Dates)\n\
                 jane@x.com,2025-05-06,,37.5\n",
            ),
        };
        ReconcileConfig::default().reconcile(&tables).unwrap()
    }

    fn output_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("timesheet-recon-{name}-{}", std::process::id()))
    }

    fn file_names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn writes_one_file_per_table() {
        let output_dir = output_dir("csv");
        let files =
            write_report(&sample_report(), &output_dir, "20250505_120000", OutputFormat::Csv)
                .unwrap();

        assert_eq!(
            file_names(&files),
            [
                "Timesheet_Reconciliation_20250505_120000_reconciliation.csv",
                "Timesheet_Reconciliation_20250505_120000_flagged.csv",
            ]
        );

        let flagged = std::fs::read_to_string(&files[1]).unwrap();
        insta::assert_snapshot!(flagged, @"
        Name,Staff ID,Email,Owner,Timesheet Period,Primary Hrs,Status
        John Roe,101,,,2025-05-05,40,Open
        ");

        std::fs::remove_dir_all(&output_dir).unwrap();
    }

    #[test]
    fn writes_workbook_with_both_sheets() {
        let output_dir = output_dir("xlsx");
        let files =
            write_report(&sample_report(), &output_dir, "20250505_120000", OutputFormat::Xlsx)
                .unwrap();
        assert_eq!(file_names(&files), ["Timesheet_Reconciliation_20250505_120000.xlsx"]);

        let reconciliation =
            Table::read_sheet("Reconciliation", &files[0], Some("Reconciliation")).unwrap();
        let rows: Vec<Vec<&str>> = reconciliation
            .rows()
            .map(|row| {
                (0..reconciliation.headers().len())
                    .map(|column| row.get(column))
                    .collect()
            })
            .collect();
        assert_eq!(
            reconciliation.headers(),
            [
                "Name",
                "Staff ID",
                "Email",
                "Owner",
                "Timesheet Period",
                "Primary Hrs",
                "Secondary Hrs",
                "Discrepancy",
            ]
        );
        assert_eq!(
            rows,
            [["Jane Doe", "100", "jane@x.com", "Retail", "2025-05-05", "40", "37.5", "2.5"]]
        );

        let flagged = Table::read_sheet("Flagged", &files[0], Some("Flagged")).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged.rows().next().unwrap().get(0), "John Roe");

        std::fs::remove_dir_all(&output_dir).unwrap();
    }
}
