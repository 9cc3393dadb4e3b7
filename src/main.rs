use clap::Parser;
use std::path::Path;
use syscode_sync::config::toml_config::TomlConfig;
use syscode_sync::utils::{logger, validation::Validate};
use syscode_sync::{CliConfig, ConfigProvider, HttpAssetApi, Reconciler, RetryPolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting syscode-sync");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Some(config_file) = config.config_file.clone() {
        match TomlConfig::from_path(Path::new(&config_file)) {
            Ok(file) => config.apply_toml(&file),
            Err(e) => {
                tracing::error!("❌ Failed to load config file {}: {}", config_file, e);
                eprintln!("❌ Failed to load config file {}: {}", config_file, e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // Preconditions: the CSV must exist, parse, and carry the three required
    // columns before any API call is made.
    let rows = match syscode_sync::read_device_rows(Path::new(config.csv_path())) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("❌ CSV precondition failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if rows.is_empty() {
        tracing::warn!("CSV contains no data rows, nothing to reconcile");
        println!("✅ Nothing to do: input CSV has no rows");
        return Ok(());
    }

    let api = HttpAssetApi::from_config(&config);
    let reconciler = Reconciler::new(api)
        .with_verify_policy(RetryPolicy::new(config.verify_attempts(), config.verify_delay()));

    let report = reconciler.run(rows).await;

    tracing::info!(
        buckets = report.buckets.len(),
        completed = report.completed(),
        failed = report.failed(),
        groups_created = report.groups_created(),
        members_applied = report.members_applied(),
        "reconciliation finished"
    );
    println!(
        "✅ Reconciliation finished: {} bucket(s), {} completed, {} failed, {} group(s) created, {} member(s) applied",
        report.buckets.len(),
        report.completed(),
        report.failed(),
        report.groups_created(),
        report.members_applied()
    );

    // Per-bucket failures are reported through the log stream; they do not
    // fail the run.
    Ok(())
}
