//! Shared test data

#![allow(dead_code)]

use vidrelay::core::{ConversationId, MessageRef};
use vidrelay::download::VideoMetadata;

pub const TEST_VIDEO_ID: &str = "dQw4w9WgXcQ";
pub const TEST_URL: &str = "https://youtu.be/dQw4w9WgXcQ";
pub const TEST_CHAT: ConversationId = ConversationId(123456789);
pub const TEST_MESSAGE: MessageRef = MessageRef(42);

/// Available video with the given duration.
pub fn sample_metadata(duration_secs: u64) -> VideoMetadata {
    VideoMetadata::new("Never Gonna Give You Up", duration_secs, "Rick Astley", None, true)
}

/// Minimal `--dump-json` output.
pub fn probe_json(title: &str, duration_secs: u64) -> String {
    serde_json::json!({
        "id": TEST_VIDEO_ID,
        "title": title,
        "duration": duration_secs,
        "uploader": "Rick Astley",
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
        "is_live": false,
        "availability": "public"
    })
    .to_string()
}
