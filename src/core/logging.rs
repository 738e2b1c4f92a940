//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup report of the yt-dlp related configuration

use anyhow::Result;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;

use crate::core::config::{self, Config};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `level` - Minimum level written to both outputs
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the log file or a logger was already set
pub fn init_logger(log_file_path: &str, level: LevelFilter) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, simplelog::Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, simplelog::Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Describes the cookies setting for the startup report.
pub fn describe_cookies(cookies_file: Option<&Path>) -> String {
    match cookies_file {
        None => "not set".to_string(),
        Some(path) if path.exists() => format!("{} (found)", path.display()),
        Some(path) => format!("{} (FILE NOT FOUND)", path.display()),
    }
}

/// Logs the acquisition configuration at application startup
pub fn log_configuration(config: &Config) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp binary:     {}", config.ytdl_bin);
    log::info!("Download folder:   {}", config.download_folder.display());
    log::info!("Max duration:      {} min", config.max_duration_minutes);
    log::info!("Upload ceiling:    {} MB", config::MAX_UPLOAD_BYTES / (1024 * 1024));

    let cookies = describe_cookies(config.cookies_file.as_deref());
    match config.cookies_file.as_deref() {
        Some(path) if !path.exists() => {
            log::error!("YTDL_COOKIES_FILE: {}", cookies);
            log::error!("   Current directory: {:?}", std::env::current_dir());
        }
        Some(_) => log::info!("YTDL_COOKIES_FILE: {}", cookies),
        None => {
            log::warn!("YTDL_COOKIES_FILE: {}", cookies);
            log::warn!("   YouTube may answer with a sign-in check without cookies");
        }
    }

    if config.extra_args.is_empty() {
        log::info!("Extra yt-dlp args: none");
    } else {
        log::info!("Extra yt-dlp args: {:?}", config.extra_args);
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_describe_cookies() {
        assert_eq!(describe_cookies(None), "not set");

        let file = NamedTempFile::new().unwrap();
        assert!(describe_cookies(Some(file.path())).ends_with("(found)"));

        let missing = Path::new("/nonexistent/vidrelay/cookies.txt");
        assert_eq!(
            describe_cookies(Some(missing)),
            "/nonexistent/vidrelay/cookies.txt (FILE NOT FOUND)"
        );
    }

    #[test]
    fn test_log_configuration_without_logger() {
        // The log facade drops records when no logger is installed
        log_configuration(&Config::default());
    }
}
