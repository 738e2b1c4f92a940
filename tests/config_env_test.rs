//! Configuration loading from the real process environment
//!
//! Run with: cargo test --test config_env_test

use log::LevelFilter;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use vidrelay::core::error::{ErrorCategory, ErrorCode};
use vidrelay::core::Config;

const KEYS: &[&str] = &[
    "YTDL_BIN",
    "YTDL_COOKIES_FILE",
    "YTDL_EXTRA_ARGS",
    "MAX_DURATION_MINUTES",
    "DOWNLOAD_FOLDER",
    "LOG_LEVEL",
    "POLL_TIMEOUT_SECS",
];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.ytdl_bin, "yt-dlp");
    assert_eq!(config.max_duration_minutes, 15);
    assert_eq!(config.poll_timeout_secs, 30);
    assert_eq!(config.log_level, LevelFilter::Info);
    assert!(config.extra_args.is_empty());
}

#[test]
#[serial]
fn test_from_env_reads_values() {
    clear_env();
    env::set_var("YTDL_BIN", "/opt/yt-dlp");
    env::set_var("YTDL_EXTRA_ARGS", "--proxy 'socks5://127.0.0.1:1080' --force-ipv4");
    env::set_var("MAX_DURATION_MINUTES", "20");
    env::set_var("DOWNLOAD_FOLDER", "/var/tmp/vidrelay");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.ytdl_bin, "/opt/yt-dlp");
    assert_eq!(config.extra_args, vec!["--proxy", "socks5://127.0.0.1:1080", "--force-ipv4"]);
    assert_eq!(config.max_duration_minutes, 20);
    assert_eq!(config.download_folder, PathBuf::from("/var/tmp/vidrelay"));
    assert_eq!(config.log_level, LevelFilter::Debug);
}

#[test]
#[serial]
fn test_from_env_rejects_zero_duration() {
    clear_env();
    env::set_var("MAX_DURATION_MINUTES", "0");

    let err = Config::from_env().unwrap_err();
    clear_env();

    assert_eq!(err.code(), ErrorCode::InvalidConfig);
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(err.context_value("value"), Some("0"));
}

#[test]
#[serial]
fn test_from_env_expands_tilde_in_cookies_path() {
    clear_env();
    env::set_var("YTDL_COOKIES_FILE", "~/cookies.txt");

    let config = Config::from_env().unwrap();
    clear_env();

    let cookies = config.cookies_file.unwrap();
    assert!(!cookies.starts_with("~"));
    assert!(cookies.ends_with("cookies.txt"));
}
