// src/cli/import_commands.rs
use crate::application::import_service::ImportService;
use crate::cli::args::{Cli, Commands};
use crate::cli::display::{show_import_result, show_rows, ImportProgress};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::credentials::Credentials;
use crate::domain::validation::ValidationMode;
use crate::infrastructure::di::ServiceContainer;
use crate::util::helper::{read_csv_file, write_failed_report};
use crossterm::style::Stylize;
use serde_json::json;
use std::io::Write;
use termcolor::StandardStream;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

#[instrument(skip_all)]
pub fn import(mut stderr: StandardStream, cli: Cli, mut settings: Settings) -> CliResult<()> {
    if let Some(Commands::Import {
        path,
        username,
        password,
        mode,
        require_title,
        proxy_url,
        batch_size,
        max_retries,
        is_json,
        failed_report,
    }) = cli.command
    {
        if let Some(proxy_url) = proxy_url {
            settings.proxy_url = proxy_url;
        }
        if let Some(batch_size) = batch_size {
            settings.import.batch_size = batch_size;
        }
        if let Some(max_retries) = max_retries {
            settings.import.max_retries = max_retries;
        }
        let mode = mode.unwrap_or(settings.import.parse_mode);
        let validation =
            ValidationMode::from_require_title(require_title || settings.import.require_title);

        let password = password.ok_or_else(|| {
            CliError::InvalidInput(
                "password required: use --password or MARKPORT_PASSWORD".to_string(),
            )
        })?;

        let text = read_csv_file(&path)?;
        let rows = ImportService::prepare(&text, mode, validation)
            .map_err(|e| CliError::from(e).context(path.display().to_string()))?;

        let services = ServiceContainer::new(&settings)?;
        let credentials = Credentials::new(username, password);

        info!("Importing {} rows from {}", rows.len(), path.display());
        writeln!(
            stderr,
            "Importing {} articles via {}",
            rows.len(),
            settings.proxy_url
        )?;

        let rt = Runtime::new()?;
        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping import");
                interrupt.cancel();
            }
        });

        let progress_bar = ImportProgress::new(rows.len());
        let result = rt.block_on(services.import_service.import_rows(
            &credentials,
            &rows,
            |progress| progress_bar.update(&progress),
            &cancel,
        ));
        progress_bar.finish();

        if is_json {
            let rendered = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::Other(format!("Failed to serialize result: {}", e)))?;
            println!("{}", rendered);
        } else {
            show_import_result(&mut stderr, &result)?;
        }

        if let Some(report) = failed_report {
            match result.failed_articles.as_deref() {
                Some(failed) if !failed.is_empty() => {
                    write_failed_report(&report, failed)?;
                    writeln!(
                        stderr,
                        "{} failed articles written to {}",
                        failed.len(),
                        report.display()
                    )?;
                }
                _ => debug!("No failed articles, skipping report"),
            }
        }

        // a late Ctrl-C does not turn a finished run into a cancelled one
        if result.cancelled {
            return Err(CliError::Cancelled);
        }
        if !result.success {
            return Err(CliError::ImportFailed(result.message));
        }
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn check(mut stderr: StandardStream, cli: Cli, settings: Settings) -> CliResult<()> {
    if let Some(Commands::Check {
        path,
        mode,
        require_title,
        is_json,
    }) = cli.command
    {
        let mode = mode.unwrap_or(settings.import.parse_mode);
        let validation =
            ValidationMode::from_require_title(require_title || settings.import.require_title);

        let text = read_csv_file(&path)?;
        match ImportService::prepare(&text, mode, validation) {
            Ok(rows) => {
                if is_json {
                    let rendered = serde_json::to_string_pretty(&json!({
                        "valid": true,
                        "rows": rows,
                    }))
                    .map_err(|e| CliError::Other(format!("Failed to serialize rows: {}", e)))?;
                    println!("{}", rendered);
                } else {
                    show_rows(&mut stderr, &rows)?;
                }
            }
            Err(e) => {
                if is_json {
                    println!(
                        "{}",
                        json!({
                            "valid": false,
                            "message": e.to_string(),
                        })
                    );
                } else {
                    writeln!(stderr, "{}", format!("{}: not importable", path.display()).yellow())?;
                }
                return Err(CliError::from(e).context(path.display().to_string()));
            }
        }
    }
    Ok(())
}
