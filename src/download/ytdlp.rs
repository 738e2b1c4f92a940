//! yt-dlp backed `MediaGateway`.
//!
//! Probing uses `--dump-json`. Downloading runs a two-tier chain:
//!   Tier 1: H.264/AAC up to 720p, remuxed to mp4
//!   Tier 2: anything up to 480p, tried once if tier 1 exits non-zero
//! The produced file is then located by its id prefix, since yt-dlp may pick
//! an extension we can't predict, and its size is checked against the ceiling.
//!
//! The cookies file and extra flags from the config are prepended to every
//! invocation as-is.

use crate::core::config::Config;
use crate::core::disk::{FileStore, LocalFileStore};
use crate::core::error::{DomainError, DomainResult, ErrorCategory, ErrorCode};
use crate::core::process::{CommandOutput, CommandRunner, TokioCommandRunner};
use crate::core::validation::VideoIdentifier;
use crate::download::constraints::size_within;
use crate::download::gateway::MediaGateway;
use crate::download::metadata::{parse_probe_output, VideoFile, VideoMetadata};
use crate::download::ytdlp_errors::{analyze_ytdlp_error, summarize_stderr, YtDlpErrorType};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Preferred selector: widely compatible H.264 + AAC, capped at 720p.
pub const PREFERRED_FORMAT: &str =
    "bv*[height<=720][vcodec^=avc1]+ba[acodec^=mp4a]/b[height<=720][ext=mp4]/bv*[height<=720]+ba/b[height<=720]";

/// Fallback selector: lower resolution, any codec.
pub const FALLBACK_FORMAT: &str = "b[height<=480][ext=mp4]/bv*[height<=480]+ba/b[height<=480]/worst";

/// Extensions accepted when locating the downloaded file, in order of preference.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "m4v", "avi", "flv"];

/// Fixed invocation settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlpSettings {
    pub binary: String,
    pub cookies_file: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl From<&Config> for YtDlpSettings {
    fn from(config: &Config) -> Self {
        Self {
            binary: config.ytdl_bin.clone(),
            cookies_file: config.cookies_file.clone(),
            extra_args: config.extra_args.clone(),
        }
    }
}

/// Which tier of the download chain ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Preferred,
    Fallback,
}

impl Tier {
    fn selector(self) -> &'static str {
        match self {
            Tier::Preferred => PREFERRED_FORMAT,
            Tier::Fallback => FALLBACK_FORMAT,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tier::Preferred => "preferred",
            Tier::Fallback => "fallback",
        }
    }
}

/// `MediaGateway` powered by yt-dlp. Stateless apart from its settings.
pub struct YtDlpGateway {
    settings: YtDlpSettings,
    runner: Arc<dyn CommandRunner>,
    fs: Arc<dyn FileStore>,
}

impl YtDlpGateway {
    /// Gateway running the real binary against the local disk.
    pub fn new(settings: YtDlpSettings) -> Self {
        Self::with_parts(settings, Arc::new(TokioCommandRunner), Arc::new(LocalFileStore))
    }

    pub fn with_parts(settings: YtDlpSettings, runner: Arc<dyn CommandRunner>, fs: Arc<dyn FileStore>) -> Self {
        Self { settings, runner, fs }
    }

    pub fn settings(&self) -> &YtDlpSettings {
        &self.settings
    }

    /// Flags prepended to every invocation: cookies, then extra args.
    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(cookies) = &self.settings.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }
        args.extend(self.settings.extra_args.iter().cloned());
        args
    }

    /// Arguments for a metadata-only probe.
    pub fn probe_args(&self, identifier: &VideoIdentifier) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(
            ["--dump-json", "--no-playlist", "--skip-download", "--no-warnings"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(identifier.canonical_url().to_string());
        args
    }

    /// Arguments for one download attempt with the given format selector.
    pub fn download_args(&self, identifier: &VideoIdentifier, target_dir: &Path, selector: &str) -> Vec<String> {
        let template = target_dir.join(format!("{}.%(ext)s", identifier.id()));
        let mut args = self.base_args();
        args.push("-f".to_string());
        args.push(selector.to_string());
        args.push("-o".to_string());
        args.push(template.display().to_string());
        args.extend(
            [
                "--no-playlist",
                "--merge-output-format",
                "mp4",
                "--remux-video",
                "mp4",
                "--no-part",
                "--no-warnings",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(identifier.canonical_url().to_string());
        args
    }

    /// Runs `yt-dlp --version`, used for the startup report.
    pub async fn tool_version(&self) -> DomainResult<String> {
        let output = self
            .runner
            .run(&self.settings.binary, &["--version".to_string()])
            .await?;
        if !output.success() {
            return Err(DomainError::new(
                ErrorCode::ToolCrashed,
                format!("yt-dlp --version failed: {}", summarize_stderr(&output.stderr)),
            ));
        }
        Ok(output.stdout.trim().to_string())
    }

    async fn run_tier(
        &self,
        identifier: &VideoIdentifier,
        target_dir: &Path,
        tier: Tier,
    ) -> DomainResult<CommandOutput> {
        log::info!(
            "Downloading {} with {} format selector",
            identifier.id(),
            tier.label()
        );
        let args = self.download_args(identifier, target_dir, tier.selector());
        self.runner.run(&self.settings.binary, &args).await
    }

    /// Files in `target_dir` whose name starts with the video id.
    fn files_for(&self, identifier: &VideoIdentifier, target_dir: &Path) -> DomainResult<Vec<PathBuf>> {
        Ok(self
            .fs
            .list_dir(target_dir)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(identifier.id()))
            })
            .collect())
    }

    /// Removes whatever a failed attempt left behind (format fragments, partial merges).
    fn clear_leftovers(&self, identifier: &VideoIdentifier, target_dir: &Path) -> DomainResult<()> {
        for path in self.files_for(identifier, target_dir)? {
            log::debug!("Removing leftover {}", path.display());
            self.fs.delete_if_exists(&path)?;
        }
        Ok(())
    }

    /// Finds the file yt-dlp produced for `identifier` inside `target_dir`.
    ///
    /// An exact `<id>.<ext>` name beats anything with an extra suffix such as
    /// a `.f136` format fragment; ties are broken by extension preference.
    pub fn locate_output(&self, identifier: &VideoIdentifier, target_dir: &Path) -> DomainResult<PathBuf> {
        let mut candidates: Vec<(bool, usize, PathBuf)> = self
            .files_for(identifier, target_dir)?
            .into_iter()
            .filter_map(|path| {
                let ext = path.extension()?.to_string_lossy().to_lowercase();
                let rank = VIDEO_EXTENSIONS.iter().position(|known| *known == ext)?;
                let suffixed = path.file_stem()?.to_string_lossy() != identifier.id();
                Some((suffixed, rank, path))
            })
            .collect();

        candidates.sort();
        candidates.into_iter().next().map(|(_, _, path)| path).ok_or_else(|| {
            log::error!(
                "yt-dlp reported success but no file for {} exists in {}",
                identifier.id(),
                target_dir.display()
            );
            DomainError::new(
                ErrorCode::FileNotFound,
                "yt-dlp finished but the downloaded file could not be found",
            )
            .with_context("video_id", identifier.id())
            .with_context("dir", target_dir.display())
        })
    }
}

/// Maps a failed invocation to the right error.
fn classify_failure(
    output: &CommandOutput,
    category: ErrorCategory,
    fallback_code: ErrorCode,
    identifier: &VideoIdentifier,
) -> DomainError {
    let summary = summarize_stderr(&output.stderr);
    let err = match analyze_ytdlp_error(&output.stderr) {
        YtDlpErrorType::AuthChallenge => DomainError::authentication_required(category, &summary),
        YtDlpErrorType::VideoUnavailable => DomainError::in_category(category, ErrorCode::VideoUnavailable, summary),
        YtDlpErrorType::Unknown => DomainError::in_category(category, fallback_code, summary),
    };
    err.with_context("video_id", identifier.id())
        .with_context("exit_code", output.exit_code.map_or("signal".to_string(), |c| c.to_string()))
}

#[async_trait]
impl MediaGateway for YtDlpGateway {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_metadata(&self, identifier: &VideoIdentifier) -> DomainResult<VideoMetadata> {
        log::debug!("Fetching metadata for {}", identifier);
        let args = self.probe_args(identifier);
        let output = self.runner.run(&self.settings.binary, &args).await?;

        if !output.success() {
            log::error!("yt-dlp failed to get metadata for {}", identifier.id());
            log::error!("yt-dlp stderr: {}", output.stderr);
            return Err(classify_failure(
                &output,
                ErrorCategory::Source,
                ErrorCode::MetadataFetchFailed,
                identifier,
            ));
        }

        let metadata = parse_probe_output(&output.stdout)?;
        log::info!(
            "Got metadata for {}: title='{}', duration={}s, available={}",
            identifier.id(),
            metadata.title(),
            metadata.duration_secs(),
            metadata.is_available()
        );
        Ok(metadata)
    }

    async fn download_to_file(
        &self,
        identifier: &VideoIdentifier,
        target_dir: &Path,
        max_bytes: u64,
    ) -> DomainResult<VideoFile> {
        self.fs.ensure_dir(target_dir)?;

        let preferred = self.run_tier(identifier, target_dir, Tier::Preferred).await?;
        if !preferred.success() {
            if analyze_ytdlp_error(&preferred.stderr) == YtDlpErrorType::AuthChallenge {
                log::error!("yt-dlp hit a sign-in challenge for {}", identifier.id());
                return Err(classify_failure(
                    &preferred,
                    ErrorCategory::Download,
                    ErrorCode::DownloadFailed,
                    identifier,
                ));
            }

            log::warn!(
                "Preferred format failed for {} (exit {:?}): {}",
                identifier.id(),
                preferred.exit_code,
                summarize_stderr(&preferred.stderr)
            );

            self.clear_leftovers(identifier, target_dir)?;
            let fallback = self.run_tier(identifier, target_dir, Tier::Fallback).await?;
            if !fallback.success() {
                log::error!("Fallback format failed for {} too", identifier.id());
                log::error!("yt-dlp stderr: {}", fallback.stderr);
                return Err(classify_failure(
                    &fallback,
                    ErrorCategory::Download,
                    ErrorCode::DownloadFailed,
                    identifier,
                )
                .with_context("attempts", 2));
            }
        }

        let path = self.locate_output(identifier, target_dir)?;
        let size = self.fs.size_of(&path)?;

        if !size_within(size, max_bytes) {
            log::warn!(
                "Downloaded {} is {} bytes, over the {} byte ceiling",
                path.display(),
                size,
                max_bytes
            );
            return Err(DomainError::file_too_large(size, max_bytes).with_context("path", path.display()));
        }

        let file = VideoFile::new(&path, size)?;
        log::info!("Downloaded {} ({:.2} MB)", file.path().display(), file.size_mb());
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::normalize;
    use pretty_assertions::assert_eq;

    fn gateway(settings: YtDlpSettings) -> YtDlpGateway {
        YtDlpGateway::new(settings)
    }

    fn plain_settings() -> YtDlpSettings {
        YtDlpSettings {
            binary: "yt-dlp".to_string(),
            cookies_file: None,
            extra_args: vec![],
        }
    }

    #[test]
    fn test_probe_args() {
        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(
            gateway(plain_settings()).probe_args(&id),
            vec![
                "--dump-json",
                "--no-playlist",
                "--skip-download",
                "--no-warnings",
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
            ]
        );
    }

    #[test]
    fn test_cookies_and_extra_args_come_first() {
        let settings = YtDlpSettings {
            binary: "yt-dlp".to_string(),
            cookies_file: Some(PathBuf::from("/etc/cookies.txt")),
            extra_args: vec!["--proxy".to_string(), "socks5://p:1080".to_string()],
        };
        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let gw = gateway(settings);

        for args in [
            gw.probe_args(&id),
            gw.download_args(&id, Path::new("/tmp/dl"), PREFERRED_FORMAT),
        ] {
            assert_eq!(
                &args[..4],
                &["--cookies", "/etc/cookies.txt", "--proxy", "socks5://p:1080"]
            );
        }
    }

    #[test]
    fn test_download_args_embed_id_and_selector() {
        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let args = gateway(plain_settings()).download_args(&id, Path::new("/tmp/dl"), FALLBACK_FORMAT);

        let f_pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f_pos + 1], FALLBACK_FORMAT);
        let o_pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o_pos + 1], "/tmp/dl/dQw4w9WgXcQ.%(ext)s");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--merge-output-format".to_string()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_locate_output_prefers_known_extensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.webm"), b"x").unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.mp4"), b"x").unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.jpg"), b"x").unwrap();
        std::fs::write(tmp.path().join("otherid0000.mp4"), b"x").unwrap();

        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let found = gateway(plain_settings()).locate_output(&id, tmp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "dQw4w9WgXcQ.mp4");
    }

    #[test]
    fn test_locate_output_prefers_exact_name_over_format_fragment() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.f136.mp4"), b"xxxxxxx").unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.webm"), b"xx").unwrap();

        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let found = gateway(plain_settings()).locate_output(&id, tmp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "dQw4w9WgXcQ.webm");
    }

    #[test]
    fn test_locate_output_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("dQw4w9WgXcQ.part"), b"x").unwrap();

        let id = normalize("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let err = gateway(plain_settings()).locate_output(&id, tmp.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileNotFound);
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            ytdl_bin: "/opt/yt-dlp".to_string(),
            extra_args: vec!["-4".to_string()],
            ..Config::default()
        };
        let settings = YtDlpSettings::from(&config);
        assert_eq!(settings.binary, "/opt/yt-dlp");
        assert_eq!(settings.extra_args, vec!["-4"]);
        assert!(settings.cookies_file.is_none());
    }
}
