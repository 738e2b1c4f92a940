use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;

use vidrelay::cli::{Cli, Commands};
use vidrelay::core::disk::LocalFileStore;
use vidrelay::core::{config, init_logger, log_configuration, Config, ConversationId, DomainResult};
use vidrelay::download::constraints;
use vidrelay::download::{
    Delivery, MediaGateway, Orchestrator, OrchestratorSettings, RequestOrder, UrlCheck, YtDlpGateway, YtDlpSettings,
};
use vidrelay::telegram::replies::format_duration;
use vidrelay::telegram::{create_bot, run_polling, setup_bot_commands, HandlerDeps, TeloxideTransport};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    let cli = Cli::parse_args();
    let config = Config::from_env()?;

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH, config.log_level)?;
    log_configuration(&config);

    let gateway = Arc::new(YtDlpGateway::new(YtDlpSettings::from(&config)));
    match gateway.tool_version().await {
        Ok(version) => log::info!("{} version: {}", config.ytdl_bin, version),
        Err(e) => log::warn!("Could not read {} version: {}", config.ytdl_bin, e),
    }

    match cli.command {
        Some(Commands::Run) => run_bot(&config, gateway).await,
        Some(Commands::Download { url, output }) => run_cli_download(&config, gateway, url, output).await,
        Some(Commands::Info { url, json }) => run_cli_info(&config, gateway, url, json).await,
        None => {
            // No command specified - default to running the bot
            log::info!("No command specified, running bot in default mode");
            run_bot(&config, gateway).await
        }
    }
}

fn build_orchestrator(config: &Config, gateway: Arc<YtDlpGateway>) -> Orchestrator {
    Orchestrator::new(gateway, Arc::new(LocalFileStore), OrchestratorSettings::from(config))
}

async fn run_bot(config: &Config, gateway: Arc<YtDlpGateway>) -> Result<()> {
    let bot = create_bot(&config::BOT_TOKEN)?;

    let me = bot.get_me().await?;
    let bot_username = me.username().to_string();
    log::info!("Bot started as @{}", bot_username);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = Arc::new(HandlerDeps::new(
        Arc::new(build_orchestrator(config, gateway)),
        Arc::new(TeloxideTransport::new(bot.clone())),
        bot_username,
    ));

    run_polling(bot, deps, config.poll_timeout_secs).await
}

/// Runs the acquisition workflow from the command line and keeps the file.
async fn run_cli_download(
    config: &Config,
    gateway: Arc<YtDlpGateway>,
    url: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let output_dir = match output {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    fs_err::create_dir_all(&output_dir)?;

    let orchestrator = build_orchestrator(config, gateway);
    let order = RequestOrder {
        raw_url: Some(url),
        conversation: ConversationId(0),
        reply_to: None,
    };

    let report = orchestrator
        .run(order, |delivery| keep_file(delivery, output_dir.clone()))
        .await;

    let saved = report.result?;
    println!("✅ Saved to {}", saved.display());
    Ok(())
}

async fn keep_file(delivery: Delivery, output_dir: PathBuf) -> DomainResult<PathBuf> {
    let file_name = delivery
        .file
        .path()
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("{}.{}", delivery.request_id, delivery.file.extension()).into());
    let dest = output_dir.join(file_name);
    fs_err::copy(delivery.file.path(), &dest)?;

    println!("🎬 {}", delivery.metadata.title());
    println!("👤 {}", delivery.metadata.uploader());
    println!(
        "⏱ {} · {:.1} MB",
        format_duration(delivery.metadata.duration_secs()),
        delivery.file.size_mb()
    );
    Ok(dest)
}

/// Probes a video and prints its metadata.
async fn run_cli_info(config: &Config, gateway: Arc<YtDlpGateway>, url: String, json: bool) -> Result<()> {
    let identifier = match gateway.validate_url(&url) {
        UrlCheck::Valid(identifier) => identifier,
        UrlCheck::Invalid { reason } => anyhow::bail!("{}: {}", url, reason),
    };

    let metadata = gateway.fetch_metadata(&identifier).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("🎬 Video Information");
    println!("====================");
    println!("URL: {}\n", identifier.canonical_url());
    println!("Title: {}", metadata.title());
    println!("Channel: {}", metadata.uploader());
    println!("Duration: {}", format_duration(metadata.duration_secs()));
    if let Some(thumbnail) = metadata.thumbnail() {
        println!("Thumbnail: {}", thumbnail);
    }
    match constraints::is_downloadable(&metadata, config.max_duration_minutes) {
        Ok(()) => println!("\n✅ Can be downloaded"),
        Err(e) => println!("\n❌ Cannot be downloaded: {}", e.message()),
    }

    Ok(())
}
