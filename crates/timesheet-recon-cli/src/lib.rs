mod config;
mod output;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, CommandFactory as _, Parser, Subcommand};
use timesheet_recon::{Diagnostic, InputTables, Report, Severity, Table};

use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "timesheet-recon",
    about = "Reconcile timesheet exports against project time actuals"
)]
#[command(disable_help_subcommand = true)]
struct Args {
    /// Config file. Defaults to timesheet-recon.toml in the working directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    files: FileArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs)]
struct FileArgs {
    /// Primary timesheet export (xlsx or CSV)
    #[arg(short, long, global = true)]
    primary: Option<PathBuf>,

    /// Mapping workbook with one sheet per segment (xlsx or xlsb)
    #[arg(
        short,
        long,
        global = true,
        conflicts_with_all = ["mapping_active", "mapping_inactive"]
    )]
    mapping: Option<PathBuf>,

    /// Mapping segment of active staff, instead of --mapping
    #[arg(long, global = true)]
    mapping_active: Option<PathBuf>,

    /// Mapping segment of inactive staff, instead of --mapping
    #[arg(long, global = true)]
    mapping_inactive: Option<PathBuf>,

    /// Secondary project time actuals export (xlsx or CSV)
    #[arg(short, long, global = true)]
    secondary: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reconciliation report files (default)
    Run {
        /// Directory the report files are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Report file format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Print discrepancies and flagged timesheets and exit
    Show,
}

pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "timesheet_recon=info,timesheet_recon_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?.1,
        None => Config::find_and_load()?
            .map(|(_, config)| config)
            .unwrap_or_default(),
    };

    let tables = read_tables(&args.files, &config)?;
    let report = config.reconcile.reconcile(&tables)?;
    log_diagnostics(&report.diagnostics);

    let command = args.command.unwrap_or(Commands::Run {
        output_dir: None,
        format: None,
    });
    match command {
        Commands::Show => show::show_discrepancies(&report),
        Commands::Run { output_dir, format } => {
            let output_dir = output_dir
                .or(config.output_dir)
                .unwrap_or_else(|| PathBuf::from("output"));
            let format = format.or(config.output_format).unwrap_or_default();
            write_report(&report, &output_dir, format)?;
        }
    }

    Ok(())
}

fn read_tables(files: &FileArgs, config: &Config) -> Result<InputTables> {
    let columns = &config.reconcile.columns;
    let inputs = &config.inputs;

    let primary = input_path(&files.primary, &inputs.primary, "primary")?;
    let secondary = input_path(&files.secondary, &inputs.secondary, "secondary")?;

    tracing::info!("Reading input files...");
    let (mapping_active, mapping_inactive) =
        match files.mapping.as_deref().or(inputs.mapping.as_deref()) {
            Some(workbook) => (
                read_sheet(&columns.active_segment, workbook)?,
                read_sheet(&columns.inactive_segment, workbook)?,
            ),
            None => {
                let active = input_path(
                    &files.mapping_active,
                    &inputs.mapping_active,
                    "mapping-active",
                )
                .context("Pass --mapping <workbook> or both mapping segment files")?;
                let inactive = input_path(
                    &files.mapping_inactive,
                    &inputs.mapping_inactive,
                    "mapping-inactive",
                )
                .context("Pass --mapping <workbook> or both mapping segment files")?;
                (
                    read_table(&columns.active_segment, active)?,
                    read_table(&columns.inactive_segment, inactive)?,
                )
            }
        };

    Ok(InputTables {
        primary: read_table("primary", primary)?,
        mapping_active,
        mapping_inactive,
        secondary: read_table("secondary", secondary)?,
    })
}

fn input_path<'a>(
    arg: &'a Option<PathBuf>,
    configured: &'a Option<PathBuf>,
    name: &str,
) -> Result<&'a Path> {
    arg.as_deref()
        .or(configured.as_deref())
        .with_context(|| format!("No {name} file given: pass --{name} or set it in [inputs]"))
}

fn read_table(name: &str, path: &Path) -> Result<Table> {
    let table = Table::read(name, path)
        .with_context(|| format!("Failed to read {name} file: {}", path.display()))?;
    tracing::info!("{}: {} rows", name, table.len());
    Ok(table)
}

// A mapping segment is the sheet named after it.
fn read_sheet(segment: &str, workbook: &Path) -> Result<Table> {
    let table = Table::read_sheet(segment, workbook, Some(segment))
        .with_context(|| format!("Failed to read mapping workbook: {}", workbook.display()))?;
    tracing::info!("{}: {} rows", segment, table.len());
    Ok(table)
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Info => tracing::info!("{diagnostic}"),
        }
    }
}

fn write_report(report: &Report, output_dir: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Generating report...");
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let files = output::write_report(report, output_dir, &timestamp, format)?;
    for file in &files {
        tracing::info!("Report written to {}", file.display());
    }
    show::print_summary(&report.summary());
    Ok(())
}
