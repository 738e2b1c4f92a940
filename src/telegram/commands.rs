//! Inbound message parsing.
//!
//! Slash commands go through teloxide's `BotCommands` parser; any other text
//! is scanned for a link so a pasted URL works without a command.

use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::utils::command::{BotCommands, ParseError};

/// Cached regex for spotting a link in free text.
/// Matches any http(s) URL, plus YouTube links pasted without a scheme.
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://\S+|(?:www\.|m\.)?(?:youtube\.com|youtu\.be)/\S+").expect("Failed to compile URL regex")
});

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "download a YouTube video: /download <link>", aliases = ["dl"])]
    Download(String),
}

/// What an inbound text asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Welcome,
    Help,
    /// Fetch a video. `url` is `None` when `/download` came without an argument.
    Acquire { url: Option<String> },
}

/// Parses an inbound text message.
///
/// Returns `None` for messages the bot should ignore: plain chatter without a
/// link, and commands addressed to another bot (`/download@other_bot`).
pub fn parse_message(text: &str, bot_username: &str) -> Option<Intent> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.starts_with('/') {
        return match Command::parse(text, bot_username) {
            Ok(Command::Start) => Some(Intent::Welcome),
            Ok(Command::Help) => Some(Intent::Help),
            Ok(Command::Download(arg)) => Some(Intent::Acquire {
                url: first_token(&arg),
            }),
            Err(ParseError::TooFewArguments { .. }) => Some(Intent::Acquire { url: None }),
            Err(ParseError::WrongBotName(name)) => {
                log::debug!("Ignoring command addressed to @{}", name);
                None
            }
            Err(e) => {
                log::debug!("Unrecognised command '{}': {}", text, e);
                Some(Intent::Help)
            }
        };
    }

    URL_REGEX.find(text).map(|m| Intent::Acquire {
        url: Some(m.as_str().to_string()),
    })
}

fn first_token(arg: &str) -> Option<String> {
    arg.split_whitespace().next().map(str::to_string)
}
