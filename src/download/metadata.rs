//! Video metadata and downloaded-file records
//!
//! `VideoMetadata` is built from yt-dlp's `--dump-json` output; `VideoFile`
//! describes the file left on disk after a successful download.

use crate::core::config::MAX_TITLE_CHARS;
use crate::core::error::{DomainError, DomainResult, ErrorCategory, ErrorCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `availability` values from yt-dlp that mean the video can't be fetched anonymously.
const RESTRICTED_AVAILABILITY: &[&str] = &["private", "premium_only", "subscriber_only", "needs_auth"];

/// Metadata of a remote video, read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    title: String,
    duration_secs: u64,
    uploader: String,
    thumbnail: Option<String>,
    available: bool,
}

impl VideoMetadata {
    /// Builds metadata; the title is trimmed and capped at 256 characters.
    pub fn new(
        title: &str,
        duration_secs: u64,
        uploader: impl Into<String>,
        thumbnail: Option<String>,
        available: bool,
    ) -> Self {
        Self {
            title: title.trim().chars().take(MAX_TITLE_CHARS).collect(),
            duration_secs,
            uploader: uploader.into(),
            thumbnail,
            available,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn uploader(&self) -> &str {
        &self.uploader
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

/// Subset of yt-dlp's info JSON we care about.
#[derive(Debug, Deserialize)]
struct ProbeInfo {
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
    thumbnail: Option<String>,
    is_live: Option<bool>,
    availability: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty() && v != "NA")
}

/// Parses the single JSON object printed by `yt-dlp --dump-json`.
///
/// # Errors
/// `source-error / metadata-fetch-failed` when stdout is not a JSON object.
pub fn parse_probe_output(stdout: &str) -> DomainResult<VideoMetadata> {
    let info: ProbeInfo = serde_json::from_str(stdout.trim()).map_err(|e| {
        DomainError::new(ErrorCode::MetadataFetchFailed, format!("Unparsable yt-dlp output: {}", e))
            .with_context("stdout_len", stdout.len())
    })?;

    let title = non_blank(info.title).unwrap_or_else(|| "Untitled".to_string());
    let uploader = non_blank(info.uploader)
        .or_else(|| non_blank(info.channel))
        .unwrap_or_else(|| "Unknown".to_string());
    let duration_secs = info
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.floor() as u64)
        .unwrap_or(0);

    let is_live = info.is_live.unwrap_or(false);
    let restricted = info
        .availability
        .as_deref()
        .is_some_and(|a| RESTRICTED_AVAILABILITY.contains(&a));

    Ok(VideoMetadata::new(
        &title,
        duration_secs,
        uploader,
        non_blank(info.thumbnail),
        !is_live && !restricted,
    ))
}

/// A downloaded video on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    path: PathBuf,
    size_bytes: u64,
    extension: String,
}

impl VideoFile {
    /// Builds a file record. Relative paths are resolved against the current directory.
    ///
    /// # Errors
    /// `download-error / download-failed` for an empty file.
    pub fn new(path: impl AsRef<Path>, size_bytes: u64) -> DomainResult<Self> {
        let path = path.as_ref();
        if size_bytes == 0 {
            return Err(DomainError::in_category(
                ErrorCategory::Download,
                ErrorCode::DownloadFailed,
                "Downloaded file is empty",
            )
            .with_context("path", path.display()));
        }

        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            path,
            size_bytes,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Lowercase extension without the dot, empty if the file has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}
