//! Bot instance creation and command registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::core::config;

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (empty token, invalid URL, client build failure)
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    if token.trim().is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "show the welcome message"),
        BotCommand::new("help", "show available commands and limits"),
        BotCommand::new("download", "download a YouTube video: /download <link>"),
    ])
    .await?;

    Ok(())
}
