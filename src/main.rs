use clap::Parser;
use hatch_enrich::config::{Cli, Command};
use hatch_enrich::utils::logger;
use hatch_enrich::{EtlEngine, EtlError, HatchingPipeline, LocalStorage};

fn report_failure(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Enrichment failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let Command::Enrich(args) = Cli::parse().command;

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::debug!("CLI args: {:?}", args);

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => report_failure(&e),
    };
    tracing::info!(
        "Mapping: {}, input: {}, output: {}",
        config.mapping_path,
        config.input_path,
        config.output_path
    );

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }
    let dry_run = config.dry_run;

    let pipeline = HatchingPipeline::new(LocalStorage::new(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled).with_dry_run(dry_run);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Done: {} updated, {} not found",
                summary.stats.updated_count,
                summary.stats.not_found_count
            );
            Ok(())
        }
        Err(e) => report_failure(&e),
    }
}
