//! Metadata & download gateway contract.
//!
//! `MediaGateway` is the trust boundary between the bot and whatever actually
//! fetches videos. The production implementation is
//! [`YtDlpGateway`](crate::download::ytdlp::YtDlpGateway); tests substitute
//! in-memory fakes.

use crate::core::error::DomainResult;
use crate::core::validation::{normalize, VideoIdentifier};
use crate::download::metadata::{VideoFile, VideoMetadata};
use async_trait::async_trait;
use std::path::Path;

/// Result of checking a raw URL at the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCheck {
    Valid(VideoIdentifier),
    Invalid { reason: String },
}

impl UrlCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, UrlCheck::Valid(_))
    }
}

#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Human-readable name of the backend, used in logs.
    fn name(&self) -> &str;

    /// Accepts or rejects a raw URL.
    fn validate_url(&self, raw: &str) -> UrlCheck {
        match normalize(raw) {
            Ok(identifier) => UrlCheck::Valid(identifier),
            Err(e) => UrlCheck::Invalid {
                reason: e.message().to_string(),
            },
        }
    }

    /// Probes the video without downloading it.
    async fn fetch_metadata(&self, identifier: &VideoIdentifier) -> DomainResult<VideoMetadata>;

    /// Downloads the video into `target_dir`.
    ///
    /// Fails with `file-too-large` when the produced file exceeds `max_bytes`.
    async fn download_to_file(
        &self,
        identifier: &VideoIdentifier,
        target_dir: &Path,
        max_bytes: u64,
    ) -> DomainResult<VideoFile>;
}
