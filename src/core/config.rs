use crate::core::error::{DomainError, DomainResult, ErrorCode};
use crate::download::args::tokenize_args;
use log::LevelFilter;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Telegram's upload ceiling for bot-sent files (50 MB)
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Video titles are trimmed and capped to this many characters
pub const MAX_TITLE_CHARS: usize = 256;

/// Default duration ceiling for a single request (in minutes)
pub const DEFAULT_MAX_DURATION_MINUTES: u32 = 15;

/// Default long-poll timeout (in seconds)
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: vidrelay.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "vidrelay.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Long enough for a 50 MB upload on a slow link
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Polling loop configuration
pub mod polling {
    use super::Duration;

    /// Delay before retrying after a failed getUpdates call (in seconds)
    pub const ERROR_RETRY_DELAY_SECS: u64 = 5;

    pub fn error_retry_delay() -> Duration {
        Duration::from_secs(ERROR_RETRY_DELAY_SECS)
    }
}

/// Runtime configuration for the acquisition workflow, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// yt-dlp executable (YTDL_BIN, default "yt-dlp")
    pub ytdl_bin: String,
    /// Netscape cookies file passed through as `--cookies` (YTDL_COOKIES_FILE)
    pub cookies_file: Option<PathBuf>,
    /// Extra yt-dlp flags, tokenized from YTDL_EXTRA_ARGS
    pub extra_args: Vec<String>,
    /// Duration ceiling per video (MAX_DURATION_MINUTES, default 15)
    pub max_duration_minutes: u32,
    /// Where temporary downloads live (DOWNLOAD_FOLDER, default ~/downloads/vidrelay)
    pub download_folder: PathBuf,
    /// Log level (LOG_LEVEL, default info)
    pub log_level: LevelFilter,
    /// Long-poll timeout (POLL_TIMEOUT_SECS, default 30)
    pub poll_timeout_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ytdl_bin: "yt-dlp".to_string(),
            cookies_file: None,
            extra_args: Vec::new(),
            max_duration_minutes: DEFAULT_MAX_DURATION_MINUTES,
            download_folder: expand_path("~/downloads/vidrelay"),
            log_level: LevelFilter::Info,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let max_duration_minutes = match get("MAX_DURATION_MINUTES") {
            Some(raw) => parse_max_duration(&raw)?,
            None => defaults.max_duration_minutes,
        };

        let poll_timeout_secs = match get("POLL_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                DomainError::new(ErrorCode::InvalidConfig, "POLL_TIMEOUT_SECS must be a non-negative integer")
                    .with_context("value", &raw)
            })?,
            None => defaults.poll_timeout_secs,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse::<LevelFilter>().map_err(|_| {
                DomainError::new(ErrorCode::InvalidConfig, "LOG_LEVEL must be one of off, error, warn, info, debug, trace")
                    .with_context("value", &raw)
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            ytdl_bin: get("YTDL_BIN").unwrap_or(defaults.ytdl_bin),
            cookies_file: get("YTDL_COOKIES_FILE").map(|p| expand_path(&p)),
            extra_args: get("YTDL_EXTRA_ARGS").map(|raw| tokenize_args(&raw)).unwrap_or_default(),
            max_duration_minutes,
            download_folder: get("DOWNLOAD_FOLDER")
                .map(|p| expand_path(&p))
                .unwrap_or(defaults.download_folder),
            log_level,
            poll_timeout_secs,
        })
    }
}

/// Parses the duration ceiling, which must be a positive integer.
pub fn parse_max_duration(raw: &str) -> DomainResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(
            DomainError::new(ErrorCode::InvalidConfig, "MAX_DURATION_MINUTES must be a positive integer")
                .with_context("value", raw),
        ),
    }
}

/// Expands a leading `~` to the home directory.
fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
