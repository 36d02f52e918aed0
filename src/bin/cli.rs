//! Project Indexer CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use project_indexer::{
    config,
    error::Result,
    models::Config,
    pipeline,
    storage::{IndexStorage, LocalStorage},
};

/// Project Indexer - GitHub and HuggingFace project aggregator
#[derive(Parser, Debug)]
#[command(
    name = "project-indexer",
    version,
    about = "Unified index of public GitHub and HuggingFace projects"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all platforms and update the index (default)
    Run,

    /// Validate configuration and report available tokens
    Validate,

    /// Show the existing index metadata
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logging needs the configured level, so read the file before initializing it
    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = config::config_or_default(&cli.config, loaded);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let (config, credentials) = config::load_all(config)?;
            let sources = pipeline::build_sources(&config, &credentials)?;
            let storage = LocalStorage::from_config(&config);

            let summary = pipeline::run_indexer(&storage, &sources).await?;
            log::info!(
                "Index saved to {} ({} projects: {} added, {} updated)",
                summary.snapshot_location,
                summary.total_projects,
                summary.added,
                summary.updated
            );
            for (source, kind) in &summary.failed_categories {
                log::warn!("  not refreshed: {} {}", source, kind.plural());
            }
            for (source, rate) in &summary.rate_limits {
                log::info!("  {} API calls left: {}", source, rate.remaining);
            }
            log::info!(
                "Finished in {}s",
                (summary.end_time - summary.start_time).num_seconds()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let (_, credentials) = match config::load_all(config) {
                Ok(loaded) => loaded,
                Err(e) => {
                    log::error!("Config validation failed: {}", e);
                    return Err(e);
                }
            };
            log::info!("✓ Config OK");

            let present = |token: &Option<String>| if token.is_some() { "found" } else { "missing" };
            log::info!("GitHub token: {}", present(&credentials.github_token));
            log::info!("HuggingFace token: {}", present(&credentials.huggingface_token));

            if !credentials.any() {
                log::warn!("No tokens available; a run would index nothing.");
            }
        }

        Command::Info => {
            let storage = LocalStorage::from_config(&config);
            log::info!("Index file: {}", storage.snapshot_location());

            match storage.load_index().await {
                Ok(Some(index)) => {
                    let meta = index.metadata();
                    log::info!("Generated at: {}", meta.generated_at);
                    log::info!("Version: {}", meta.version);
                    log::info!("Total projects: {}", meta.total_projects);
                    for (source, count) in &meta.sources {
                        log::info!("  {}: {}", source, count);
                    }
                    for (kind, count) in &meta.types {
                        log::info!("  {}: {}", kind, count);
                    }
                }
                Ok(None) => log::info!("No index found yet."),
                Err(e) => log::warn!("{}", e),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
