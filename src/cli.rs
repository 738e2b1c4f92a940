use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidrelay")]
#[command(author, version, about = "Telegram bot that fetches YouTube videos with yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Download one video locally through the same workflow the bot uses
    Download {
        /// YouTube video URL
        url: String,

        /// Directory the finished file is copied to (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe a video and print its metadata without downloading
    Info {
        /// YouTube video URL
        url: String,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
