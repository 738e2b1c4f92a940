//! In-memory stand-ins for the external collaborators.
//!
//! - `ScriptedRunner` replays queued yt-dlp outputs and can drop a file where
//!   the `-o` template points, like a real download would.
//! - `FakeGateway` skips the process layer entirely.
//! - `FakeTransport` records everything the bot would have sent.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vidrelay::core::error::{DomainError, DomainResult, ErrorCode};
use vidrelay::core::process::{CommandOutput, CommandRunner};
use vidrelay::core::validation::VideoIdentifier;
use vidrelay::core::{ConversationId, MessageRef};
use vidrelay::download::{MediaGateway, VideoFile, VideoMetadata};
use vidrelay::telegram::{MessagingTransport, ProgressKind};

/// Creates a sparse file of `size` bytes.
fn write_sized_file(path: &Path, size: u64) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    file.set_len(size)
}

// ============================================================================
// Process runner
// ============================================================================

/// One scripted invocation result.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub output: CommandOutput,
    /// When set, a file of this size is written at the `-o` template
    pub writes_bytes: Option<u64>,
    /// Substituted for `%(ext)s` in the written file name
    pub writes_ext: &'static str,
}

impl Scripted {
    pub fn stdout(stdout: &str) -> Self {
        Self {
            output: CommandOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
            writes_bytes: None,
            writes_ext: "mp4",
        }
    }

    pub fn failure(stderr: &str) -> Self {
        Self {
            output: CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
            writes_bytes: None,
            writes_ext: "mp4",
        }
    }

    /// Failed download that still leaves `<id>.<ext>` of `size` bytes behind,
    /// e.g. a `f136.mp4` format fragment from an aborted merge.
    pub fn failure_leaving(stderr: &str, ext: &'static str, size: u64) -> Self {
        Self {
            writes_bytes: Some(size),
            writes_ext: ext,
            ..Self::failure(stderr)
        }
    }

    /// Successful download that leaves a file of `size` bytes behind.
    pub fn download(size: u64) -> Self {
        Self {
            writes_bytes: Some(size),
            ..Self::stdout("")
        }
    }
}

#[derive(Default)]
pub struct ScriptedRunner {
    steps: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new(steps: Vec<Scripted>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Argument vectors of every invocation so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Value following `-f`/`-o` style flags.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, _program: &str, args: &[String]) -> DomainResult<CommandOutput> {
        self.calls.lock().unwrap().push(args.to_vec());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DomainError::new(ErrorCode::ToolCrashed, "no scripted output left"))?;

        if let (Some(size), Some(template)) = (step.writes_bytes, flag_value(args, "-o")) {
            write_sized_file(Path::new(&template.replace("%(ext)s", step.writes_ext)), size)?;
        }
        Ok(step.output)
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Gateway returning canned results.
///
/// The download ceiling passed in is not enforced, so callers' own size
/// guards can be exercised.
pub struct FakeGateway {
    metadata: DomainResult<VideoMetadata>,
    download: DomainResult<u64>,
    fetch_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl FakeGateway {
    /// Probe returns `metadata`; download writes a file of `size` bytes.
    pub fn new(metadata: VideoMetadata, size: u64) -> Self {
        Self {
            metadata: Ok(metadata),
            download: Ok(size),
            fetch_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_fetch(error: DomainError) -> Self {
        Self {
            metadata: Err(error),
            ..Self::new(super::fixtures::sample_metadata(60), 1024)
        }
    }

    pub fn failing_download(metadata: VideoMetadata, error: DomainError) -> Self {
        Self {
            download: Err(error),
            ..Self::new(metadata, 1024)
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_metadata(&self, _identifier: &VideoIdentifier) -> DomainResult<VideoMetadata> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.metadata.clone()
    }

    async fn download_to_file(
        &self,
        identifier: &VideoIdentifier,
        target_dir: &Path,
        _max_bytes: u64,
    ) -> DomainResult<VideoFile> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let size = self.download.clone()?;

        std::fs::create_dir_all(target_dir)?;
        let path = target_dir.join(format!("{}.mp4", identifier.id()));
        write_sized_file(&path, size)?;
        VideoFile::new(path, size)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Something the bot sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        conversation: ConversationId,
        text: String,
        reply_to: Option<MessageRef>,
    },
    File {
        conversation: ConversationId,
        path: PathBuf,
        caption: String,
        reply_to: Option<MessageRef>,
        /// Whether the file existed when it was handed over
        existed: bool,
    },
    Progress {
        conversation: ConversationId,
        kind: ProgressKind,
    },
}

#[derive(Default)]
pub struct FakeTransport {
    sent: Mutex<Vec<Sent>>,
    fail_files: bool,
    next_id: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose file uploads always fail.
    pub fn failing_uploads() -> Self {
        Self {
            fail_files: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn files(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::File { .. }))
            .collect()
    }

    fn next_ref(&self) -> MessageRef {
        MessageRef(1000 + self.next_id.fetch_add(1, Ordering::SeqCst) as i32)
    }
}

#[async_trait]
impl MessagingTransport for FakeTransport {
    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef> {
        self.sent.lock().unwrap().push(Sent::Text {
            conversation,
            text: text.to_string(),
            reply_to,
        });
        Ok(self.next_ref())
    }

    async fn send_file(
        &self,
        conversation: ConversationId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef> {
        self.sent.lock().unwrap().push(Sent::File {
            conversation,
            path: path.to_path_buf(),
            caption: caption.to_string(),
            reply_to,
            existed: path.exists(),
        });
        if self.fail_files {
            return Err(DomainError::new(ErrorCode::SendFailed, "Bad Request: upload refused"));
        }
        Ok(self.next_ref())
    }

    async fn send_progress(&self, conversation: ConversationId, kind: ProgressKind) -> DomainResult<()> {
        self.sent.lock().unwrap().push(Sent::Progress { conversation, kind });
        Ok(())
    }
}
