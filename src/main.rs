use cfpihole::cloudflare::policy::LIST_CHUNK_SIZE;
use cfpihole::domain::ports::{ConfigProvider, Pipeline};
use cfpihole::utils::error::ErrorSeverity;
use cfpihole::utils::{logger, validation::Validate};
use cfpihole::{BlocklistPipeline, Credentials, GatewayClient, LocalStorage, SyncEngine, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cfpihole")]
#[command(about = "Sync Pi-hole style blocklists into Cloudflare Zero Trust Gateway")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Download and parse lists without touching Cloudflare
    #[arg(long)]
    dry_run: bool,

    /// Log per-phase CPU/memory stats
    #[arg(long)]
    monitor: bool,

    /// Emit JSON logs for CI log collection
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_ci_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting cfpihole");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("❌ Missing Cloudflare credentials");
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let rate_limits = config.rate_limits();
    let gateway = GatewayClient::new(config.api_url(), &credentials);
    let storage = LocalStorage::new(config.tmp_dir().to_string());
    let pipeline = BlocklistPipeline::new(storage, config, gateway, rate_limits)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - Cloudflare will not be touched");

        let raw_lists = pipeline.extract().await?;
        let plan = pipeline.transform(raw_lists).await?;

        println!(
            "Would sync {} unique domains ({} raw) across {} lists",
            plan.unique_count(),
            plan.total_raw_domains,
            plan.unique_count().div_ceil(LIST_CHUNK_SIZE)
        );
        if pipeline.has_tld_suppressions() {
            println!(
                "Would maintain the TLD block policy ({} suppressed TLDs)",
                plan.tld_suppressions.len()
            );
        }
        return Ok(());
    }

    let engine = SyncEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Sync completed successfully!");
            println!("✅ {}", summary);
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
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

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
