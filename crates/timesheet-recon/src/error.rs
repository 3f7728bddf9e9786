/// Structural failures. Any of these aborts the run without producing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("table '{table}' could not be read: {source}")]
    Csv { table: String, source: csv::Error },

    #[error("table '{table}' could not be read from its workbook: {source}")]
    Workbook {
        table: String,
        source: calamine::Error,
    },

    #[error("table '{table}' has no sheet named '{sheet}'")]
    MissingSheet { table: String, sheet: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
