use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Remediation steps shown to the user when YouTube asks for a sign-in check.
pub const AUTH_REMEDIATION_HINTS: &[&str] = &[
    "Refresh the cookies file (YTDL_COOKIES_FILE) from a logged-in browser session",
    "Route requests through a different network egress (proxy or VPN)",
    "Update yt-dlp to the latest release (yt-dlp -U)",
];

/// Broad grouping of failures, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Source,
    Download,
    Transport,
    Configuration,
    System,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Source => "source-error",
            ErrorCategory::Download => "download-error",
            ErrorCategory::Transport => "transport-error",
            ErrorCategory::Configuration => "configuration-error",
            ErrorCategory::System => "system-error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific failure code. Codes drive the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingUrl,
    InvalidUrl,
    VideoUnavailable,
    VideoTooLong,
    MetadataFetchFailed,
    AuthenticationRequired,
    DownloadFailed,
    FileNotFound,
    FileTooLarge,
    SendFailed,
    InvalidConfig,
    ToolCrashed,
    IoFailure,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingUrl => "missing-url",
            ErrorCode::InvalidUrl => "invalid-url",
            ErrorCode::VideoUnavailable => "video-unavailable",
            ErrorCode::VideoTooLong => "video-too-long",
            ErrorCode::MetadataFetchFailed => "metadata-fetch-failed",
            ErrorCode::AuthenticationRequired => "authentication-required",
            ErrorCode::DownloadFailed => "download-failed",
            ErrorCode::FileNotFound => "file-not-found",
            ErrorCode::FileTooLarge => "file-too-large",
            ErrorCode::SendFailed => "send-failed",
            ErrorCode::InvalidConfig => "invalid-config",
            ErrorCode::ToolCrashed => "tool-crashed",
            ErrorCode::IoFailure => "io-failure",
            ErrorCode::Internal => "internal-error",
        }
    }

    /// Category a code belongs to when the failure site does not pick one explicitly.
    pub fn default_category(&self) -> ErrorCategory {
        match self {
            ErrorCode::MissingUrl | ErrorCode::InvalidUrl | ErrorCode::VideoUnavailable | ErrorCode::VideoTooLong => {
                ErrorCategory::Validation
            }
            ErrorCode::MetadataFetchFailed | ErrorCode::AuthenticationRequired => ErrorCategory::Source,
            ErrorCode::DownloadFailed | ErrorCode::FileNotFound | ErrorCode::FileTooLarge => ErrorCategory::Download,
            ErrorCode::SendFailed => ErrorCategory::Transport,
            ErrorCode::InvalidConfig => ErrorCategory::Configuration,
            ErrorCode::ToolCrashed | ErrorCode::IoFailure | ErrorCode::Internal => ErrorCategory::System,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure record passed up unchanged from the failure site.
///
/// Built once with [`DomainError::new`] (plus optional `with_context` calls
/// at the construction site) and never mutated afterwards.
#[derive(Error, Debug, Clone)]
#[error("[{category}/{code}] {message}")]
pub struct DomainError {
    category: ErrorCategory,
    code: ErrorCode,
    message: String,
    context: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
}

/// Type alias for Result with DomainError
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::in_category(code.default_category(), code, message)
    }

    pub fn in_category(category: ErrorCategory, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
            context: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    pub fn missing_url() -> Self {
        Self::new(ErrorCode::MissingUrl, "No video URL was supplied")
    }

    pub fn invalid_url(raw: &str) -> Self {
        Self::new(ErrorCode::InvalidUrl, "Not a recognised YouTube video URL").with_context("input", raw)
    }

    pub fn video_too_long(duration_secs: u64, max_minutes: u32) -> Self {
        Self::new(
            ErrorCode::VideoTooLong,
            format!("Video lasts {}s, limit is {} min", duration_secs, max_minutes),
        )
        .with_context("duration_secs", duration_secs)
        .with_context("max_minutes", max_minutes)
    }

    pub fn file_too_large(size_bytes: u64, max_bytes: u64) -> Self {
        Self::new(
            ErrorCode::FileTooLarge,
            format!("Downloaded file is {} bytes, ceiling is {} bytes", size_bytes, max_bytes),
        )
        .with_context("size_bytes", size_bytes)
        .with_context("max_bytes", max_bytes)
    }

    pub fn authentication_required(category: ErrorCategory, diagnostic: &str) -> Self {
        Self::in_category(
            category,
            ErrorCode::AuthenticationRequired,
            "YouTube asked for a sign-in check before serving this video",
        )
        .with_context("diagnostic", diagnostic)
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Remediation hints attached to this failure, empty for most codes.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self.code {
            ErrorCode::AuthenticationRequired => AUTH_REMEDIATION_HINTS,
            _ => &[],
        }
    }

    /// Renders the single message shown in the chat for this failure.
    pub fn user_message(&self) -> String {
        let headline = match self.code {
            ErrorCode::MissingUrl => {
                "Send me a video link, for example:\n/download https://youtu.be/dQw4w9WgXcQ".to_string()
            }
            ErrorCode::InvalidUrl => "That doesn't look like a YouTube video link.".to_string(),
            ErrorCode::VideoUnavailable => {
                "This video is unavailable.\n\nIt may be private, removed, a live stream or restricted.".to_string()
            }
            ErrorCode::VideoTooLong => match self.context_value("max_minutes") {
                Some(max) => format!("This video is too long. I can only fetch videos up to {} minutes.", max),
                None => "This video is too long.".to_string(),
            },
            ErrorCode::MetadataFetchFailed => "Couldn't read the video info. Check the link and try again.".to_string(),
            ErrorCode::AuthenticationRequired => "YouTube blocked the request with a sign-in check.".to_string(),
            ErrorCode::DownloadFailed | ErrorCode::FileNotFound => {
                "Couldn't download the video. Try again later.".to_string()
            }
            ErrorCode::FileTooLarge => "The video file is too large to send here (limit is 50 MB).".to_string(),
            ErrorCode::SendFailed => "Downloaded the video but couldn't send it. Try again later.".to_string(),
            ErrorCode::InvalidConfig | ErrorCode::ToolCrashed | ErrorCode::IoFailure | ErrorCode::Internal => {
                "Something went wrong on my side. Try again later.".to_string()
            }
        };

        let mut text = format!("❌ {}", headline);
        let hints = self.remediation();
        if !hints.is_empty() {
            text.push_str("\n\nWhat can help:");
            for hint in hints {
                text.push_str("\n• ");
                text.push_str(hint);
            }
        }
        text
    }
}

/// Filesystem failures outside a specific operation become `system-error / io-failure`.
impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::new(ErrorCode::IoFailure, err.to_string())
    }
}
