//! Vidrelay - Telegram bot that fetches YouTube videos with yt-dlp
//!
//! A chat command carrying a YouTube link becomes one acquisition request:
//! the link is normalized, the video is probed, checked against the duration
//! limit, downloaded with a format fallback and sent back to the chat.
//!
//! # Module Structure
//!
//! - `core`: configuration, error taxonomy, logging, URL normalizer, process and filesystem seams
//! - `download`: gateway contract, yt-dlp adapter, request state machine and orchestrator
//! - `telegram`: transport contract, command parsing, reply texts and the polling loop
//! - `cli`: command line interface

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use self::core::{config, DomainError, DomainResult};
pub use download::{MediaGateway, Orchestrator, YtDlpGateway};
