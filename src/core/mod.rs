//! Core utilities, configuration, and common functionality

pub mod config;
pub mod disk;
pub mod error;
pub mod logging;
pub mod process;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{DomainError, DomainResult, ErrorCategory, ErrorCode};
pub use logging::{init_logger, log_configuration};
pub use types::{ConversationId, MessageRef};
pub use validation::{normalize, VideoIdentifier};
