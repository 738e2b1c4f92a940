//! Video acquisition: gateway contract, yt-dlp adapter and the request workflow

pub mod args;
pub mod constraints;
pub mod gateway;
pub mod metadata;
pub mod orchestrator;
pub mod request;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use gateway::{MediaGateway, UrlCheck};
pub use metadata::{VideoFile, VideoMetadata};
pub use orchestrator::{AcquisitionReport, Delivery, Orchestrator, OrchestratorSettings, RequestOrder};
pub use request::{AcquisitionRequest, RequestStatus, TransitionError};
pub use ytdlp::{YtDlpGateway, YtDlpSettings};
