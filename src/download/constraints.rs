//! Download constraints: availability, duration ceiling and upload size ceiling.

use crate::core::config::MAX_UPLOAD_BYTES;
use crate::core::error::{DomainError, DomainResult, ErrorCode};
use crate::download::metadata::{VideoFile, VideoMetadata};

/// Checks that a video may be downloaded under the given duration ceiling.
///
/// Availability is checked first: an unavailable video is reported as such
/// even when it is also too long.
pub fn is_downloadable(metadata: &VideoMetadata, max_duration_minutes: u32) -> DomainResult<()> {
    if !metadata.is_available() {
        return Err(
            DomainError::new(ErrorCode::VideoUnavailable, "Video is not available for download")
                .with_context("title", metadata.title()),
        );
    }

    let limit_secs = u64::from(max_duration_minutes) * 60;
    if metadata.duration_secs() > limit_secs {
        return Err(DomainError::video_too_long(metadata.duration_secs(), max_duration_minutes));
    }

    Ok(())
}

/// Whether `size_bytes` fits under `max_bytes` (inclusive).
pub fn size_within(size_bytes: u64, max_bytes: u64) -> bool {
    size_bytes <= max_bytes
}

/// Whether the file fits under Telegram's fixed upload ceiling.
pub fn within_size_limit(file: &VideoFile) -> bool {
    size_within(file.size_bytes(), MAX_UPLOAD_BYTES)
}
