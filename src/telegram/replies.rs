//! Texts the bot sends back to the chat.

use crate::core::error::DomainError;
use crate::download::metadata::{VideoFile, VideoMetadata};
use crate::telegram::commands::Command;
use teloxide::utils::command::BotCommands;

pub const WELCOME_TEXT: &str = "👋 Hi! Send me a YouTube link and I'll send the video back.\n\n\
     You can paste the link as is, or use /download <link>.";

pub const PROGRESS_TEXT: &str = "⏳ Fetching video info...";

/// Help text listing commands and the active limits.
pub fn help_text(max_duration_minutes: u32) -> String {
    format!(
        "{}\n\nYou can also just paste a YouTube link.\nVideos up to {} minutes, files up to 50 MB.",
        Command::descriptions(),
        max_duration_minutes
    )
}

/// Formats seconds as `m:ss`.
///
/// # Example
///
/// ```
/// use vidrelay::telegram::replies::format_duration;
///
/// assert_eq!(format_duration(125), "2:05");
/// ```
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Caption attached to a delivered video.
pub fn success_caption(metadata: &VideoMetadata, file: &VideoFile) -> String {
    format!(
        "🎬 {}\n👤 {}\n⏱ {} · {:.1} MB",
        metadata.title(),
        metadata.uploader(),
        format_duration(metadata.duration_secs()),
        file.size_mb()
    )
}

pub fn failure_text(error: &DomainError) -> String {
    error.user_message()
}
