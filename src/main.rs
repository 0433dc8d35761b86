use bhe_query_import::utils::error::ErrorSeverity;
use bhe_query_import::utils::{logger, validation::Validate};
use bhe_query_import::core::ConfigProvider;
use bhe_query_import::{CliConfig, ImportPipeline, ReqwestBackend, SignedTransport};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting bhe-query-import");

    let settings = match cli.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    let backend = ReqwestBackend::new(Duration::from_secs(settings.timeout_seconds()))?;
    let sources = settings.query_sources(&backend);
    let transport = SignedTransport::from_config(&settings, backend);
    let mut pipeline = ImportPipeline::new(transport);

    let summary = pipeline.run_all(&sources).await;

    for (label, e) in &summary.source_errors {
        eprintln!("❌ Error importing from {}: {}", label, e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    }
    for report in &summary.reports {
        if let Some(e) = &report.fatal {
            eprintln!("❌ Import from {} stopped: {}", report.source, e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        }
    }

    println!("\nImport Summary:");
    println!("Total queries imported: {}", summary.imported());
    if summary.failed() > 0 {
        println!("Failed queries: {}", summary.failed());
    }

    // 依最嚴重的錯誤決定結尾日誌等級
    match summary.worst_severity() {
        None => tracing::info!("Import finished"),
        Some(ErrorSeverity::Low) | Some(ErrorSeverity::Medium) => {
            tracing::warn!("Import finished with recoverable errors")
        }
        Some(severity) => tracing::error!("Import finished with {:?} severity errors", severity),
    }

    Ok(())
}
