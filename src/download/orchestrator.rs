//! Acquisition orchestrator
//!
//! Drives one [`AcquisitionRequest`] end to end:
//! normalize -> fetch metadata -> validate -> download -> deliver -> cleanup.
//!
//! The first failing step marks the request `failed` and stops the workflow;
//! the only retry is the format fallback inside the gateway. Every download
//! goes into its own per-request directory, which is removed once the
//! workflow ends, whether delivery succeeded or not.

use crate::core::config::{self, Config};
use crate::core::disk::FileStore;
use crate::core::error::{DomainError, DomainResult, ErrorCode};
use crate::core::types::{ConversationId, MessageRef};
use crate::download::constraints;
use crate::download::gateway::{MediaGateway, UrlCheck};
use crate::download::metadata::{VideoFile, VideoMetadata};
use crate::download::request::{AcquisitionRequest, RequestStatus};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Limits and locations used by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub download_dir: PathBuf,
    pub max_duration_minutes: u32,
    pub max_upload_bytes: u64,
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            download_dir: config.download_folder.clone(),
            max_duration_minutes: config.max_duration_minutes,
            max_upload_bytes: config::MAX_UPLOAD_BYTES,
        }
    }
}

/// Parsed command handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrder {
    /// Raw URL argument, `None` when the command carried no argument
    pub raw_url: Option<String>,
    pub conversation: ConversationId,
    pub reply_to: Option<MessageRef>,
}

/// What the delivery step receives once a request has completed.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub request_id: Uuid,
    pub conversation: ConversationId,
    pub reply_to: Option<MessageRef>,
    pub canonical_url: String,
    pub metadata: VideoMetadata,
    pub file: VideoFile,
}

/// Outcome of one workflow run.
///
/// `request` is `None` only when the input was rejected before a request
/// could be created (missing or invalid URL). `result` carries the delivery
/// result on success, or the error that stopped the workflow.
#[derive(Debug)]
pub struct AcquisitionReport<T> {
    pub request: Option<AcquisitionRequest>,
    pub result: DomainResult<T>,
}

impl<T> AcquisitionReport<T> {
    fn rejected(error: DomainError) -> Self {
        Self {
            request: None,
            result: Err(error),
        }
    }

    pub fn status(&self) -> Option<RequestStatus> {
        self.request.as_ref().map(AcquisitionRequest::status)
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.result.as_ref().err()
    }
}

pub struct Orchestrator {
    gateway: Arc<dyn MediaGateway>,
    fs: Arc<dyn FileStore>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn MediaGateway>, fs: Arc<dyn FileStore>, settings: OrchestratorSettings) -> Self {
        Self { gateway, fs, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Runs the whole workflow for one order.
    ///
    /// `deliver` is called only when the request completed. The downloaded
    /// file is removed afterwards regardless of what `deliver` returned.
    pub async fn run<T, D, Fut>(&self, order: RequestOrder, deliver: D) -> AcquisitionReport<T>
    where
        D: FnOnce(Delivery) -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let raw = match order.raw_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                log::info!("Chat {}: command without a URL", order.conversation);
                return AcquisitionReport::rejected(DomainError::missing_url());
            }
        };

        let identifier = match self.gateway.validate_url(raw) {
            UrlCheck::Valid(identifier) => identifier,
            UrlCheck::Invalid { reason } => {
                log::info!("Chat {}: rejected URL '{}': {}", order.conversation, raw, reason);
                return AcquisitionReport::rejected(DomainError::invalid_url(raw));
            }
        };

        let mut request = match AcquisitionRequest::new(
            identifier,
            order.conversation,
            order.reply_to,
            self.settings.max_duration_minutes,
        ) {
            Ok(request) => request,
            Err(e) => {
                log::error!("Chat {}: cannot create request: {}", order.conversation, e);
                return AcquisitionReport::rejected(e);
            }
        };
        log::info!(
            "Request {} created for {} (chat {})",
            request.id(),
            request.target().id(),
            request.conversation()
        );

        let request_dir = self.settings.download_dir.join(request.id().to_string());
        let acquired = self.acquire(&mut request, &request_dir).await;

        let result = match acquired {
            Ok(()) => match self.delivery_for(&request) {
                Some(delivery) => {
                    let file_path = delivery.file.path().to_path_buf();
                    let delivered = deliver(delivery).await;
                    if let Err(e) = &delivered {
                        log::error!("Request {}: delivery failed: {}", request.id(), e);
                    }
                    self.remove(&file_path);
                    delivered
                }
                None => Err(DomainError::new(ErrorCode::Internal, "Completed request has no file attached")),
            },
            Err(e) => Err(e),
        };

        self.remove(&request_dir);

        AcquisitionReport {
            request: Some(request),
            result,
        }
    }

    /// Takes the request from `pending` to a terminal state.
    async fn acquire(&self, request: &mut AcquisitionRequest, request_dir: &Path) -> DomainResult<()> {
        match self.acquire_steps(request, request_dir).await {
            Ok(()) => {
                log::info!("Request {} completed", request.id());
                Ok(())
            }
            Err(e) => {
                if let Err(transition) = request.fail(e.clone()) {
                    log::error!("Request {}: could not mark as failed: {}", request.id(), transition);
                }
                Err(e)
            }
        }
    }

    async fn acquire_steps(&self, request: &mut AcquisitionRequest, request_dir: &Path) -> DomainResult<()> {
        request.begin_fetch()?;
        let metadata = self.gateway.fetch_metadata(request.target()).await?;

        request.attach_metadata(metadata)?;
        request.begin_download()?;

        let ceiling = self.upload_ceiling();
        let file = self
            .gateway
            .download_to_file(request.target(), request_dir, ceiling)
            .await?;

        if !constraints::within_size_limit(&file) || !constraints::size_within(file.size_bytes(), ceiling) {
            log::warn!(
                "Request {}: {} bytes is over the {} byte upload ceiling",
                request.id(),
                file.size_bytes(),
                ceiling
            );
            return Err(DomainError::file_too_large(file.size_bytes(), ceiling).with_context("path", file.path().display()));
        }

        request.complete(file)?;
        Ok(())
    }

    /// Configured ceiling, never above the platform limit.
    fn upload_ceiling(&self) -> u64 {
        self.settings.max_upload_bytes.min(config::MAX_UPLOAD_BYTES)
    }

    fn delivery_for(&self, request: &AcquisitionRequest) -> Option<Delivery> {
        Some(Delivery {
            request_id: request.id(),
            conversation: request.conversation(),
            reply_to: request.reply_to(),
            canonical_url: request.target().canonical_url().to_string(),
            metadata: request.metadata()?.clone(),
            file: request.file()?.clone(),
        })
    }

    /// Deletes a path, logging instead of failing.
    fn remove(&self, path: &Path) {
        if let Err(e) = self.fs.delete_if_exists(path) {
            log::error!("Cleanup of {} failed: {}", path.display(), e);
        }
    }
}
