//! State machine for a single video request.
//!
//! Lifecycle:
//!
//! ```text
//! pending -> fetching-metadata -> validating -> downloading -> completed
//!    \____________\_________________\_____________\__________-> failed
//! ```
//!
//! The state enum carries the data that is only legal in some states, so
//! "metadata only from validating onward", "file only when completed" and
//! "error only when failed" hold by construction. Transitions taken out of
//! order return [`TransitionError::OutOfOrder`]; there is no way back out of
//! a terminal state.

use crate::core::error::{DomainError, DomainResult, ErrorCode};
use crate::core::types::{ConversationId, MessageRef};
use crate::core::validation::VideoIdentifier;
use crate::download::constraints;
use crate::download::metadata::{VideoFile, VideoMetadata};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Status without payload, for logging and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    FetchingMetadata,
    Validating,
    Downloading,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::FetchingMetadata => "fetching-metadata",
            RequestStatus::Validating => "validating",
            RequestStatus::Downloading => "downloading",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Failed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum RequestState {
    Pending,
    FetchingMetadata,
    Validating {
        metadata: VideoMetadata,
    },
    Downloading {
        metadata: VideoMetadata,
    },
    Completed {
        metadata: VideoMetadata,
        file: VideoFile,
    },
    Failed {
        metadata: Option<VideoMetadata>,
        error: DomainError,
    },
}

impl RequestState {
    fn status(&self) -> RequestStatus {
        match self {
            RequestState::Pending => RequestStatus::Pending,
            RequestState::FetchingMetadata => RequestStatus::FetchingMetadata,
            RequestState::Validating { .. } => RequestStatus::Validating,
            RequestState::Downloading { .. } => RequestStatus::Downloading,
            RequestState::Completed { .. } => RequestStatus::Completed,
            RequestState::Failed { .. } => RequestStatus::Failed,
        }
    }

    fn metadata(&self) -> Option<&VideoMetadata> {
        match self {
            RequestState::Validating { metadata }
            | RequestState::Downloading { metadata }
            | RequestState::Completed { metadata, .. } => Some(metadata),
            RequestState::Failed { metadata, .. } => metadata.as_ref(),
            RequestState::Pending | RequestState::FetchingMetadata => None,
        }
    }
}

/// A transition that could not be taken.
#[derive(Error, Debug, Clone)]
pub enum TransitionError {
    /// Programming error: the aggregate is not in the state the transition needs.
    #[error("cannot move to {attempted} from {from}")]
    OutOfOrder {
        from: RequestStatus,
        attempted: RequestStatus,
    },

    /// The constraint validator refused the attached metadata.
    #[error("download refused: {0}")]
    Rejected(DomainError),
}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Rejected(e) => e,
            TransitionError::OutOfOrder { from, attempted } => DomainError::new(
                ErrorCode::Internal,
                format!("Invalid request transition {} -> {}", from, attempted),
            )
            .with_context("from", from)
            .with_context("attempted", attempted),
        }
    }
}

/// One video acquisition, from parsed command to terminal state.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    id: Uuid,
    target: VideoIdentifier,
    conversation: ConversationId,
    reply_to: Option<MessageRef>,
    max_duration_minutes: u32,
    state: RequestState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AcquisitionRequest {
    /// Creates a request in `pending`.
    ///
    /// # Errors
    /// `configuration-error / invalid-config` for a zero duration ceiling.
    pub fn new(
        target: VideoIdentifier,
        conversation: ConversationId,
        reply_to: Option<MessageRef>,
        max_duration_minutes: u32,
    ) -> DomainResult<Self> {
        if max_duration_minutes == 0 {
            return Err(DomainError::new(
                ErrorCode::InvalidConfig,
                "Duration ceiling must be at least one minute",
            )
            .with_context("max_minutes", max_duration_minutes));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            target,
            conversation,
            reply_to,
            max_duration_minutes,
            state: RequestState::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &VideoIdentifier {
        &self.target
    }

    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub fn reply_to(&self) -> Option<MessageRef> {
        self.reply_to
    }

    pub fn max_duration_minutes(&self) -> u32 {
        self.max_duration_minutes
    }

    pub fn status(&self) -> RequestStatus {
        self.state.status()
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.state.metadata()
    }

    pub fn file(&self) -> Option<&VideoFile> {
        match &self.state {
            RequestState::Completed { file, .. } => Some(file),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DomainError> {
        match &self.state {
            RequestState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error().map(DomainError::message)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn out_of_order(&self, attempted: RequestStatus) -> TransitionError {
        log::error!(
            "Request {}: refused transition {} -> {}",
            self.id,
            self.status(),
            attempted
        );
        TransitionError::OutOfOrder {
            from: self.status(),
            attempted,
        }
    }

    fn set_state(&mut self, state: RequestState) {
        let from = self.status();
        self.state = state;
        self.updated_at = Utc::now();
        log::debug!("Request {}: {} -> {}", self.id, from, self.status());
    }

    /// `pending -> fetching-metadata`
    pub fn begin_fetch(&mut self) -> Result<(), TransitionError> {
        match self.state {
            RequestState::Pending => {
                self.set_state(RequestState::FetchingMetadata);
                Ok(())
            }
            _ => Err(self.out_of_order(RequestStatus::FetchingMetadata)),
        }
    }

    /// `fetching-metadata -> validating`, attaching the probed metadata.
    pub fn attach_metadata(&mut self, metadata: VideoMetadata) -> Result<(), TransitionError> {
        match self.state {
            RequestState::FetchingMetadata => {
                self.set_state(RequestState::Validating { metadata });
                Ok(())
            }
            _ => Err(self.out_of_order(RequestStatus::Validating)),
        }
    }

    /// `validating -> downloading`, only if the metadata passes the constraints.
    ///
    /// On [`TransitionError::Rejected`] the state is unchanged; the caller is
    /// expected to [`fail`](Self::fail) the request with the carried error.
    pub fn begin_download(&mut self) -> Result<(), TransitionError> {
        let metadata = match &self.state {
            RequestState::Validating { metadata } => metadata,
            _ => return Err(self.out_of_order(RequestStatus::Downloading)),
        };

        constraints::is_downloadable(metadata, self.max_duration_minutes).map_err(TransitionError::Rejected)?;

        let metadata = metadata.clone();
        self.set_state(RequestState::Downloading { metadata });
        Ok(())
    }

    /// `downloading -> completed`, attaching the downloaded file.
    pub fn complete(&mut self, file: VideoFile) -> Result<(), TransitionError> {
        match &self.state {
            RequestState::Downloading { metadata } => {
                let metadata = metadata.clone();
                self.set_state(RequestState::Completed { metadata, file });
                Ok(())
            }
            _ => Err(self.out_of_order(RequestStatus::Completed)),
        }
    }

    /// `any non-terminal -> failed`
    pub fn fail(&mut self, error: DomainError) -> Result<(), TransitionError> {
        if self.status().is_terminal() {
            return Err(self.out_of_order(RequestStatus::Failed));
        }
        log::info!("Request {} failed: {}", self.id, error);
        let metadata = self.state.metadata().cloned();
        self.set_state(RequestState::Failed { metadata, error });
        Ok(())
    }
}
