// ==========================================
// Asset Back Office - CLI Entry Point
// ==========================================
// Runs one import against a SQLite database and prints the run
// report as JSON. Defaults to preview; --commit persists.
// ==========================================

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use asset_backoffice::authorization::AllowAll;
use asset_backoffice::domain::types::ImportMode;
use asset_backoffice::importer::{AssetImporter, ImportRequest};
use asset_backoffice::repository::{ImportLogRepository, LookupRepository};
use asset_backoffice::{db, logging};

struct CliArgs {
    db_path: String,
    file_path: String,
    mode: ImportMode,
    clear_tables: bool,
    requested_by: String,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut mode = ImportMode::Preview;
    let mut clear_tables = false;
    let mut requested_by = "cli".to_string();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--commit" => mode = ImportMode::Commit,
            "--clear-tables" => clear_tables = true,
            "--user" => {
                requested_by = args
                    .next()
                    .ok_or_else(|| "--user requires a value".to_string())?;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag: {other}"));
            }
            other => positional.push(other.to_string()),
        }
    }

    if positional.len() != 2 {
        return Err(
            "usage: asset-backoffice <db_path> <workbook.xlsx> [--commit] [--clear-tables] [--user NAME]"
                .to_string(),
        );
    }
    let mut positional = positional.into_iter();
    Ok(CliArgs {
        db_path: positional.next().unwrap_or_default(),
        file_path: positional.next().unwrap_or_default(),
        mode,
        clear_tables,
        requested_by,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let payload = match std::fs::read(&args.file_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(file = %args.file_path, error = %err, "cannot read workbook");
            return ExitCode::FAILURE;
        }
    };

    let conn = match db::open_sqlite_connection(&args.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            tracing::error!(db = %args.db_path, error = %err, "cannot open database");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = db::ensure_schema(&conn) {
        tracing::error!(error = %err, "cannot prepare schema");
        return ExitCode::FAILURE;
    }

    let db = Arc::new(Mutex::new(conn));
    let importer = AssetImporter::new(
        Arc::clone(&db),
        Arc::new(LookupRepository::new(Arc::clone(&db))),
        ImportLogRepository::new(Arc::clone(&db)),
        AllowAll,
    );

    let file_name = std::path::Path::new(&args.file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file_path.clone());

    let request = ImportRequest {
        payload,
        file_name,
        mode: args.mode,
        clear_tables: args.clear_tables,
        requested_by: args.requested_by,
    };

    match importer.run(request).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                if report.totals.failed > 0 {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot serialize report");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
