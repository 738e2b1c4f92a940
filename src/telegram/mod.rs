//! Telegram bot integration: transport, commands, replies and the polling loop

pub mod bot;
pub mod commands;
pub mod handlers;
pub mod polling;
pub mod replies;
pub mod transport;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands};
pub use commands::{parse_message, Command};
pub use handlers::{handle_text, HandlerDeps};
pub use polling::{run_polling, PollState};
pub use transport::{MessagingTransport, ProgressKind, TeloxideTransport};
