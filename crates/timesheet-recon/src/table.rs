//! Untyped, already-parsed input tables.
//!
//! The engine only ever sees a [`Table`] of string cells. The loaders here turn
//! CSV files and workbook sheets into one, and the typed records are derived
//! from it using the column names declared in [`crate::Columns`].

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;

use calamine::{Data, DataType as _, Reader as _};

use crate::{Diagnostic, ReconcileError, Result};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// `(row, column)` of cells that were not valid UTF-8.
    undecodable: Vec<(usize, usize)>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_owned()).collect();
        Table {
            name: name.into(),
            headers,
            rows,
            undecodable: Vec::new(),
        }
    }

    /// Read a CSV table with a header row.
    ///
    /// Cells that are not valid UTF-8 (Latin-1 exports, mostly) are decoded
    /// with replacement characters and reported by [`Table::encoding_diagnostics`].
    pub fn from_csv_reader(name: impl Into<String>, reader: impl Read) -> Result<Self> {
        let name = name.into();
        let csv_error = |source| ReconcileError::Csv {
            table: name.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader
            .byte_headers()
            .map_err(csv_error)?
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();

        let mut rows = Vec::new();
        let mut undecodable = Vec::new();
        for record in reader.byte_records() {
            let record = record.map_err(csv_error)?;
            let row = rows.len();
            let cells = record
                .iter()
                .enumerate()
                .map(|(column, field)| match String::from_utf8_lossy(field) {
                    Cow::Borrowed(cell) => cell.to_owned(),
                    Cow::Owned(cell) => {
                        undecodable.push((row, column));
                        cell
                    }
                })
                .collect();
            rows.push(cells);
        }

        let mut table = Table::new(name, headers, rows);
        table.undecodable = undecodable;
        Ok(table)
    }

    pub fn read_csv(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let name = name.into();
        let file = std::fs::File::open(path).map_err(|error| ReconcileError::Csv {
            table: name.clone(),
            source: error.into(),
        })?;
        Self::from_csv_reader(name, file)
    }

    /// Read one sheet of a workbook (xlsx, xlsb, xls or ods), or its first sheet
    /// when `sheet` is `None`. The first non-empty row holds the headers and
    /// blank rows are skipped.
    pub fn read_sheet(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        sheet: Option<&str>,
    ) -> Result<Self> {
        let name = name.into();
        let workbook_error = |source| ReconcileError::Workbook {
            table: name.clone(),
            source,
        };

        let mut workbook = calamine::open_workbook_auto(path).map_err(workbook_error)?;
        let sheet_names = workbook.sheet_names();
        let sheet = match sheet {
            Some(sheet) if sheet_names.iter().any(|candidate| candidate == sheet) => {
                sheet.to_owned()
            }
            Some(sheet) => {
                return Err(ReconcileError::MissingSheet {
                    table: name.clone(),
                    sheet: sheet.to_owned(),
                });
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or(calamine::Error::Msg("workbook has no sheets"))
                .map_err(workbook_error)?,
        };
        let range = workbook.worksheet_range(&sheet).map_err(workbook_error)?;

        let mut rows = range
            .rows()
            .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)))
            .map(|row| row.iter().map(sheet_cell).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();
        let rows = rows.collect();
        tracing::debug!("read sheet '{sheet}' as table '{name}'");

        Ok(Table::new(name, headers, rows))
    }

    /// Read a workbook's first sheet or a CSV file, by extension.
    pub fn read(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            Self::read_sheet(name, path, None)
        } else {
            Self::read_csv(name, path)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a required column.
    pub fn column(&self, column: &str) -> Result<usize> {
        let wanted = column.trim();
        self.headers
            .iter()
            .position(|header| header == wanted)
            .ok_or_else(|| ReconcileError::MissingColumn {
                table: self.name.clone(),
                column: wanted.to_owned(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| Row { index, cells })
    }

    /// One diagnostic per cell that had to be decoded lossily.
    pub fn encoding_diagnostics(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.undecodable
            .iter()
            .map(|&(row, column)| Diagnostic::InvalidEncoding {
                table: self.name.clone(),
                row,
                column: self
                    .headers
                    .get(column)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", column + 1)),
            })
    }
}

fn sheet_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// Zero-based position in the table, header excluded.
    pub index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell at `column`, empty when the row is short.
    pub fn get(&self, column: usize) -> &'a str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_csv_trims_headers() {
        let source = "RESOURCEID , UNITS_CONSUMED\n100,40\n101,8.5\n";
        let table = Table::from_csv_reader("primary", source.as_bytes()).unwrap();

        assert_eq!(table.headers(), ["RESOURCEID", "UNITS_CONSUMED"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("UNITS_CONSUMED").unwrap(), 1);
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let source = "a,b,c\n1\n";
        let table = Table::from_csv_reader("t", source.as_bytes()).unwrap();
        let row = table.rows().next().unwrap();

        assert_eq!(row.get(0), "1");
        assert_eq!(row.get(2), "");
    }

    #[test]
    fn latin1_cells_are_replaced_and_reported() {
        let source = b"RESOURCEID,RESOURCE_NAME\n100,Jane Doe\n101,Jos\xE9 Roe\n";
        let table = Table::from_csv_reader("primary", &source[..]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows().nth(1).unwrap().get(1), "Jos\u{FFFD} Roe");
        assert_eq!(
            table.encoding_diagnostics().collect::<Vec<_>>(),
            [Diagnostic::InvalidEncoding {
                table: "primary".to_owned(),
                row: 1,
                column: "RESOURCE_NAME".to_owned(),
            }]
        );
    }

    fn mapping_workbook(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for (sheet, staff_id, email) in [
            ("Offshore Active", 100.0, "jane@x.com"),
            ("Offshore Inactive", 101.0, "john@x.com"),
        ] {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet).unwrap();
            worksheet.write_string(0, 0, "PS ID").unwrap();
            worksheet.write_string(0, 1, "CG Email Id").unwrap();
            worksheet.write_string(0, 2, "P&L Owner new").unwrap();
            worksheet.write_number(2, 0, staff_id).unwrap();
            worksheet.write_string(2, 1, email).unwrap();
            worksheet.write_string(2, 2, "Retail").unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn read_named_sheets_of_a_workbook() {
        let dir =
            std::env::temp_dir().join(format!("timesheet-recon-table-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mapping.xlsx");
        mapping_workbook(&path);

        let inactive =
            Table::read_sheet("Offshore Inactive", &path, Some("Offshore Inactive")).unwrap();
        assert_eq!(inactive.headers(), ["PS ID", "CG Email Id", "P&L Owner new"]);
        assert_eq!(inactive.len(), 1);
        let row = inactive.rows().next().unwrap();
        assert_eq!(row.get(0), "101");
        assert_eq!(row.get(1), "john@x.com");

        let first = Table::read("mapping", &path).unwrap();
        assert_eq!(first.rows().next().unwrap().get(1), "jane@x.com");

        let error = Table::read_sheet("mapping", &path, Some("Offshore")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "table 'mapping' has no sheet named 'Offshore'"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_column_is_named() {
        let table = Table::new("primary", vec!["RESOURCEID".into()], Vec::new());
        let error = table.column("TSSTATUS").unwrap_err();

        assert_eq!(
            error.to_string(),
            "table 'primary' is missing required column 'TSSTATUS'"
        );
    }
}
