use anyhow::Context;
use clap::Parser;
use std::path::Path;
use ticket_intake::domain::ports::Storage;
use ticket_intake::utils::error::ErrorSeverity;
use ticket_intake::utils::{logger, validation::Validate};
use ticket_intake::{
    CliConfig, ImportEngine, ImportRequest, ImportStatus, InMemoryTicketRepository, LocalStorage,
    TicketManager,
};

const EXIT_PARTIAL_SUCCESS: i32 = 4;
const EXIT_ALL_FAILED: i32 = 5;

fn exit_code_for(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let toml = match cli.load_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code_for(e.severity()));
        }
    };

    let json_logs = cli.log_json || toml.as_ref().is_some_and(|t| t.json_logs());
    let log_level = toml.as_ref().and_then(|t| t.log_level());
    if json_logs {
        logger::init_json_logger(cli.verbose, log_level);
    } else {
        logger::init_cli_logger(cli.verbose, log_level);
    }

    tracing::info!("Starting ticket-intake CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let validated = cli
        .validate()
        .and_then(|_| match &toml {
            Some(toml) => toml.validate(),
            None => Ok(()),
        })
        .and_then(|_| cli.import_config(toml.as_ref()));
    let import_config = match validated {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code_for(e.severity()));
        }
    };

    let input = Path::new(&cli.file);
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.clone());

    let storage = LocalStorage::new(".");
    let content = match storage.read_file(&cli.file).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("❌ Cannot read {}: {}", cli.file, e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code_for(e.severity()));
        }
    };

    let mut request = ImportRequest::new(filename, content).validate_only(cli.validate_only);
    request.format = cli.format.clone();
    request.import_batch = cli.import_batch.clone();

    let service = TicketManager::new(InMemoryTicketRepository::new());
    let engine = ImportEngine::new(service, import_config);

    let report = match engine.import(request).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code_for(e.severity()));
        }
    };

    let rendered =
        serde_json::to_string_pretty(&report).context("Failed to serialize import report")?;
    println!("{}", rendered);

    if let Some(output) = &cli.output {
        storage
            .write_file(output, rendered.as_bytes())
            .await
            .with_context(|| format!("Failed to write report to {}", output))?;
        tracing::info!("📁 Report saved to: {}", output);
    }

    match report.status() {
        ImportStatus::Success => {
            tracing::info!("✅ Imported {} tickets", report.success_count);
            Ok(())
        }
        ImportStatus::PartialSuccess => {
            tracing::warn!(
                "⚠️ Imported {} of {} tickets; failed rows: {:?}",
                report.success_count,
                report.total_records,
                report.failed_rows()
            );
            std::process::exit(EXIT_PARTIAL_SUCCESS);
        }
        ImportStatus::Failed => {
            tracing::error!("❌ Every record failed ({} rows)", report.failure_count);
            std::process::exit(EXIT_ALL_FAILED);
        }
    }
}
