//! YouTube URL normalization
//!
//! Turns user input into a [`VideoIdentifier`]:
//! - Whitelist of four URL shapes (watch, youtu.be, shorts, mobile watch)
//! - Each shape must carry exactly an 11-character video id
//! - Output is always rewritten to the canonical long-form watch URL
//!
//! Anything that does not match one of the shapes is rejected outright.

use crate::core::error::{DomainError, DomainResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Length of a YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

const CANONICAL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Which of the accepted URL shapes matched the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    Watch,
    ShortLink,
    Shorts,
    Mobile,
}

static URL_PATTERNS: Lazy<Vec<(UrlShape, Regex)>> = Lazy::new(|| {
    let patterns = [
        (
            UrlShape::Watch,
            r"^(?:https?://)?(?:www\.)?youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]{11})(?:[&#]\S*)?$",
        ),
        (
            UrlShape::ShortLink,
            r"^(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]{11})(?:[?#]\S*)?$",
        ),
        (
            UrlShape::Shorts,
            r"^(?:https?://)?(?:www\.)?youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[/?#]\S*)?$",
        ),
        (
            UrlShape::Mobile,
            r"^(?:https?://)?m\.youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]{11})(?:[&#]\S*)?$",
        ),
    ];
    patterns
        .into_iter()
        .filter_map(|(shape, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((shape, re)),
            Err(e) => {
                log::error!("Failed to compile URL pattern for {:?}: {}", shape, e);
                None
            }
        })
        .collect()
});

/// Normalized reference to a remote video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoIdentifier {
    id: String,
    canonical_url: String,
}

impl VideoIdentifier {
    /// Opaque 11-character id token.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Long-form watch URL built from the id.
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }
}

impl fmt::Display for VideoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_url)
    }
}

impl FromStr for VideoIdentifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Returns the matching shape and extracted id, trying the patterns in order.
pub fn match_url(raw: &str) -> Option<(UrlShape, &str)> {
    let trimmed = raw.trim();
    URL_PATTERNS.iter().find_map(|(shape, re)| {
        re.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| (*shape, m.as_str()))
    })
}

/// Parses a raw string into a [`VideoIdentifier`].
///
/// # Errors
/// `validation / invalid-url` when no known shape matches.
///
/// # Examples
/// ```
/// use vidrelay::core::validation::normalize;
///
/// let id = normalize("https://youtu.be/dQw4w9WgXcQ?si=abc").unwrap();
/// assert_eq!(id.id(), "dQw4w9WgXcQ");
/// assert_eq!(id.canonical_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
/// assert!(normalize("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// ```
pub fn normalize(raw: &str) -> DomainResult<VideoIdentifier> {
    let (shape, id) = match_url(raw).ok_or_else(|| DomainError::invalid_url(raw))?;
    debug_assert_eq!(id.len(), VIDEO_ID_LEN);
    log::debug!("Matched {:?} URL shape, video id {}", shape, id);

    Ok(VideoIdentifier {
        id: id.to_string(),
        canonical_url: format!("{}{}", CANONICAL_PREFIX, id),
    })
}
