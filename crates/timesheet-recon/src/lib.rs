//! Reconciling primary timesheet exports against secondary project time actuals.

pub mod config;
pub mod diagnostics;
mod error;
pub mod filter;
pub mod identity;
mod parse;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod table;

pub type Decimal = rust_decimal::Decimal;

pub use config::{Columns, ReconcileConfig};
pub use diagnostics::{Diagnostic, Severity};
pub use error::{ReconcileError, Result};
pub use reconcile::InputTables;
pub use report::Report;
pub use table::Table;
