//! Turns one inbound text message into replies and, for links, one acquisition run.

use crate::core::error::DomainResult;
use crate::core::types::{ConversationId, MessageRef};
use crate::core::validation;
use crate::download::orchestrator::{Delivery, Orchestrator, RequestOrder};
use crate::telegram::commands::{parse_message, Intent};
use crate::telegram::replies;
use crate::telegram::transport::{MessagingTransport, ProgressKind};
use std::sync::Arc;

/// Shared dependencies for message handlers.
pub struct HandlerDeps {
    pub orchestrator: Arc<Orchestrator>,
    pub transport: Arc<dyn MessagingTransport>,
    /// Bot username without `@`, used to accept `/cmd@name`
    pub bot_username: String,
}

impl HandlerDeps {
    pub fn new(orchestrator: Arc<Orchestrator>, transport: Arc<dyn MessagingTransport>, bot_username: String) -> Self {
        Self {
            orchestrator,
            transport,
            bot_username,
        }
    }
}

/// Handles one text message.
///
/// A failed acquisition is reported to the chat and then returned as `Err`
/// so the caller can log it. Messages the bot ignores return `Ok(())`.
pub async fn handle_text(
    deps: &HandlerDeps,
    conversation: ConversationId,
    message: MessageRef,
    text: &str,
) -> DomainResult<()> {
    let Some(intent) = parse_message(text, &deps.bot_username) else {
        return Ok(());
    };

    match intent {
        Intent::Welcome => {
            deps.transport.send_text(conversation, replies::WELCOME_TEXT, None).await?;
            Ok(())
        }
        Intent::Help => {
            let text = replies::help_text(deps.orchestrator.settings().max_duration_minutes);
            deps.transport.send_text(conversation, &text, None).await?;
            Ok(())
        }
        Intent::Acquire { url } => acquire(deps, conversation, message, url).await,
    }
}

async fn acquire(
    deps: &HandlerDeps,
    conversation: ConversationId,
    message: MessageRef,
    url: Option<String>,
) -> DomainResult<()> {
    // Progress feedback only for links that will actually be probed
    if url.as_deref().and_then(validation::match_url).is_some() {
        if let Err(e) = deps.transport.send_progress(conversation, ProgressKind::Typing).await {
            log::warn!("Chat {}: progress indicator not sent: {}", conversation, e);
        }
        if let Err(e) = deps
            .transport
            .send_text(conversation, replies::PROGRESS_TEXT, Some(message))
            .await
        {
            log::warn!("Chat {}: progress notice not sent: {}", conversation, e);
        }
    }

    let order = RequestOrder {
        raw_url: url,
        conversation,
        reply_to: Some(message),
    };
    let transport = Arc::clone(&deps.transport);
    let report = deps.orchestrator.run(order, move |delivery| deliver(transport, delivery)).await;

    match report.result {
        Ok(sent) => {
            log::info!("Chat {}: video delivered as message {}", conversation, sent);
            Ok(())
        }
        Err(e) => {
            log::warn!("Chat {}: request failed: {}", conversation, e);
            let text = replies::failure_text(&e);
            if let Err(send_err) = deps.transport.send_text(conversation, &text, Some(message)).await {
                log::error!("Chat {}: failure reply not sent: {}", conversation, send_err);
            }
            Err(e)
        }
    }
}

async fn deliver(transport: Arc<dyn MessagingTransport>, delivery: Delivery) -> DomainResult<MessageRef> {
    if let Err(e) = transport
        .send_progress(delivery.conversation, ProgressKind::UploadingVideo)
        .await
    {
        log::warn!("Chat {}: upload indicator not sent: {}", delivery.conversation, e);
    }

    let caption = replies::success_caption(&delivery.metadata, &delivery.file);
    log::info!(
        "Request {}: sending {} ({:.1} MB)",
        delivery.request_id,
        delivery.file.path().display(),
        delivery.file.size_mb()
    );
    transport
        .send_file(delivery.conversation, delivery.file.path(), &caption, delivery.reply_to)
        .await
}
