// ==========================================
// Sponsorship MIS - bulk import CLI
// ==========================================
// sponsorship-import [--db PATH] [-v|-q] --role manager import --entity child --file kids.xlsx [--json]
// sponsorship-import [--db PATH] --role administrator normalize-contacts
// sponsorship-import [--db PATH] init-db
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sponsorship_import::api::{ApiError, ImportApi};
use sponsorship_import::db::{
    default_db_path, init_schema, open_sqlite_connection, read_schema_version,
};
use sponsorship_import::domain::{EntityKind, ImportReport, Operator, Role};
use sponsorship_import::importer::CancelFlag;
use sponsorship_import::logging;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "sponsorship-import", version, about = "Sponsorship MIS spreadsheet import")]
struct Cli {
    /// SQLite database (default: $SPONSORSHIP_MIS_DB_PATH or the user data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Role of the operator running the command; import and
    /// normalize-contacts need manager or administrator
    #[arg(long, global = true, default_value = "staff")]
    role: Role,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the tables if missing
    InitDb,

    /// Import a spreadsheet into one table
    Import {
        /// child | sponsor | client | chart_of_account
        #[arg(long)]
        entity: EntityKind,

        /// .xlsx / .xls / .xlsm / .ods / .csv
        #[arg(long)]
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prefix '+' to stored phone numbers that lack it
    NormalizeContacts,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    logging::init_with_level(level);

    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    let db_path_str = db_path.to_string_lossy().to_string();
    let operator = Operator::new(
        std::env::var("USER").unwrap_or_else(|_| "operator".to_string()),
        cli.role,
    );

    match cli.command {
        Command::InitDb => {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let conn = open_sqlite_connection(&db_path_str)
                .with_context(|| format!("opening {}", db_path_str))?;
            init_schema(&conn).context("creating tables")?;
            let version = read_schema_version(&conn)?.unwrap_or_default();
            info!(db = %db_path_str, version, "database ready");
            println!("Database ready: {} (schema v{})", db_path_str, version);
            Ok(ExitCode::SUCCESS)
        }

        Command::Import { entity, file, json } => {
            let api = ImportApi::new(db_path_str);
            let cancel = CancelFlag::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, stopping after the current chunk");
                    ctrl_c.cancel();
                }
            });

            match api.import_file(&operator, entity, &file, &cancel).await {
                Ok(response) => {
                    print_report(&response.report, json)?;
                    if response.counts.failed > 0 {
                        Ok(ExitCode::from(2))
                    } else {
                        Ok(ExitCode::SUCCESS)
                    }
                }
                Err(err) => {
                    if let Some(report) = err.report() {
                        print_report(report, json)?;
                    }
                    eprintln!("error: {}", err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::NormalizeContacts => {
            let api = ImportApi::new(db_path_str);
            match api.normalize_contacts(&operator).await {
                Ok(response) => {
                    for table in &response.tables {
                        println!("{}: {} record(s) updated", table.table, table.records_updated);
                    }
                    println!("Total: {}", response.total_updated());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err @ ApiError::AccessDenied(_)) => {
                    eprintln!("error: {}", err);
                    Ok(ExitCode::FAILURE)
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}

fn print_report(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let counts = report.counts();
    println!("Import of {} ({}) run {}", report.file_name, report.entity, report.run_id);
    println!(
        "  rows: {}  created: {}  updated: {}  skipped: {}  failed: {}",
        counts.total, counts.created, counts.updated, counts.skipped, counts.failed
    );
    if report.cancelled {
        println!("  cancelled before the end of the file");
    }
    if report.aborted {
        println!("  aborted");
    }
    for line in report.error_lines() {
        println!("  {}", line);
    }
    Ok(())
}
