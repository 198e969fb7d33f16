use anyhow::Context;
use clap::Parser;
use pdrf_scraper::core::ConfigProvider;
use pdrf_scraper::utils::error::{ErrorSeverity, ScraperError};
use pdrf_scraper::utils::{logger, validation::Validate};
use pdrf_scraper::{CliConfig, EtlEngine, LocalStorage, PdrfPipeline, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting pdrf-scraper");

    let dry_run = cli.dry_run;
    match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            run(config, dry_run).await
        }
        None => {
            if let Some(path) = &cli.dataset_static_file {
                tracing::info!("📁 Loading static dataset fields from: {}", path);
            }
            cli.load_dataset_static()
                .context("failed to load static dataset fields")?;
            if cli.verbose {
                tracing::debug!("CLI config: {:?}", cli);
            }
            run(cli, dry_run).await
        }
    }
}

async fn run<C>(config: C, dry_run: bool) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = PdrfPipeline::new(storage, config)?;
    let engine = EtlEngine::new(pipeline);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - layers are listed but not packaged");
        let layers = match engine.dry_run().await {
            Ok(layers) => layers,
            Err(e) => exit_with(e),
        };
        for layer in &layers {
            println!("{}", serde_json::to_string(layer)?);
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ {} layers found, {} datasets written",
                summary.layers_found,
                summary.datasets_written.len()
            );
            for (layer_url, reason) in &summary.failures {
                eprintln!("⚠️ {}: {}", layer_url, reason);
            }
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: ScraperError) -> ! {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
