//! Analysis of yt-dlp diagnostic output
//!
//! Classifies stderr so the adapter can tell a sign-in challenge apart from
//! ordinary unavailability or a generic failure.

/// Kind of failure reported by yt-dlp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// YouTube demanded a sign-in / bot check, or the cookies were rejected
    AuthChallenge,
    /// Video is private, removed or region locked
    VideoUnavailable,
    /// Anything else
    Unknown,
}

/// Lowercase phrases yt-dlp prints when YouTube asks for a sign-in check.
const AUTH_CHALLENGE_PHRASES: &[&str] = &[
    "confirm you're not a bot",
    "confirm you\u{2019}re not a bot",
    "confirm that you're not a bot",
    "use --cookies-from-browser",
    "use --cookies for the authentication",
    "cookies are no longer valid",
    "cookies have likely been rotated",
    "please sign in",
    "sign in to confirm your age",
];

const UNAVAILABLE_PHRASES: &[&str] = &[
    "private video",
    "video unavailable",
    "this video is not available",
    "video is private",
    "video has been removed",
    "this video does not exist",
    "video is not available",
];

/// Returns true when stderr carries a sign-in challenge signature (case-insensitive).
pub fn is_auth_challenge(stderr: &str) -> bool {
    let stderr_lower = stderr.to_lowercase();
    AUTH_CHALLENGE_PHRASES.iter().any(|p| stderr_lower.contains(p))
}

/// Analyzes yt-dlp stderr and determines the error type.
///
/// Sign-in challenges win over unavailability since YouTube often prints
/// both ("Video unavailable. Sign in to confirm you're not a bot").
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    if is_auth_challenge(stderr) {
        return YtDlpErrorType::AuthChallenge;
    }

    let stderr_lower = stderr.to_lowercase();
    if UNAVAILABLE_PHRASES.iter().any(|p| stderr_lower.contains(p)) {
        return YtDlpErrorType::VideoUnavailable;
    }

    YtDlpErrorType::Unknown
}

/// Extracts the most useful line from stderr for error messages.
///
/// Prefers the last `ERROR:` line, otherwise the last non-empty line.
/// The result is capped at 300 characters.
pub fn summarize_stderr(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let line = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .copied()
        .unwrap_or("no diagnostic output");

    line.chars().take(300).collect()
}
