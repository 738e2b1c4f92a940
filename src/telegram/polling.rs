//! Long-poll loop.
//!
//! A single task owns [`PollState`] and fetches updates after the current
//! offset. Each text message is handed to its own tokio task, so one slow
//! download never blocks the next update. Ctrl-C stops the loop; tasks
//! already spawned are left to finish.

use crate::core::config;
use crate::core::types::{ConversationId, MessageRef};
use crate::telegram::handlers::{handle_text, HandlerDeps};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, UpdateKind};
use tokio::signal;
use tokio::time::sleep;

/// Offset and running flag of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    offset: i32,
    running: bool,
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

impl PollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            running: true,
        }
    }

    /// Offset to pass to the next `getUpdates` call.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Marks an update as seen. The offset only moves forward.
    pub fn advance(&mut self, update_id: u32) {
        let next = i32::try_from(update_id).map_or(i32::MAX, |id| id.saturating_add(1));
        self.offset = self.offset.max(next);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// Runs the polling loop until Ctrl-C.
pub async fn run_polling(bot: Bot, deps: Arc<HandlerDeps>, timeout_secs: u32) -> anyhow::Result<()> {
    let mut state = PollState::new();
    log::info!("Polling for updates (timeout {}s)", timeout_secs);

    while state.is_running() {
        poll_once(&bot, &deps, &mut state, timeout_secs).await;
    }

    log::info!("Polling stopped at offset {}", state.offset());
    Ok(())
}

async fn poll_once(bot: &Bot, deps: &Arc<HandlerDeps>, state: &mut PollState, timeout_secs: u32) {
    let request = bot
        .get_updates()
        .offset(state.offset())
        .timeout(timeout_secs)
        .allowed_updates(vec![AllowedUpdate::Message]);

    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Received Ctrl-C, shutting down");
            state.stop();
        }
        result = request.send() => match result {
            Ok(updates) => {
                for update in updates {
                    state.advance(update.id.0);
                    dispatch(deps, update);
                }
            }
            Err(e) => {
                log::error!("getUpdates failed: {}", e);
                wait_before_retry(state, signal::ctrl_c()).await;
            }
        }
    }
}

/// Sleeps out the retry delay unless `shutdown` resolves first.
async fn wait_before_retry<F>(state: &mut PollState, shutdown: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        _ = shutdown => {
            log::info!("Received Ctrl-C while waiting to retry, shutting down");
            state.stop();
        }
        _ = sleep(config::polling::error_retry_delay()) => {}
    }
}

fn dispatch(deps: &Arc<HandlerDeps>, update: Update) {
    let UpdateKind::Message(msg) = update.kind else {
        return;
    };
    let Some(text) = msg.text().map(str::to_string) else {
        return;
    };

    let conversation = ConversationId(msg.chat.id.0);
    let message = MessageRef(msg.id.0);
    let deps = Arc::clone(deps);

    tokio::spawn(async move {
        if let Err(e) = handle_text(&deps, conversation, message, &text).await {
            log::debug!("Chat {}: message {} ended with {}", conversation, message, e.code());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_running_at_zero() {
        let state = PollState::new();
        assert_eq!(state.offset(), 0);
        assert!(state.is_running());
    }

    #[test]
    fn test_advance_moves_past_update() {
        let mut state = PollState::new();
        state.advance(41);
        assert_eq!(state.offset(), 42);
        state.advance(42);
        assert_eq!(state.offset(), 43);
    }

    #[test]
    fn test_advance_never_goes_back() {
        let mut state = PollState::new();
        state.advance(100);
        state.advance(7);
        assert_eq!(state.offset(), 101);
    }

    #[tokio::test]
    async fn test_shutdown_during_retry_wait_stops_loop() {
        let mut state = PollState::new();
        wait_before_retry(&mut state, std::future::ready(Ok(()))).await;
        assert!(!state.is_running());
    }

    #[test]
    fn test_stop() {
        let mut state = PollState::new();
        state.stop();
        assert!(!state.is_running());
    }
}
