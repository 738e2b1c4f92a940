//! Messaging transport contract and its teloxide implementation.

use crate::core::error::{DomainError, DomainResult, ErrorCode};
use crate::core::types::{ConversationId, MessageRef};
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, MessageId, ReplyParameters};
use teloxide::RequestError;

/// Chat action shown while a request is being worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Typing,
    UploadingVideo,
}

impl ProgressKind {
    fn chat_action(self) -> ChatAction {
        match self {
            ProgressKind::Typing => ChatAction::Typing,
            ProgressKind::UploadingVideo => ChatAction::UploadVideo,
        }
    }
}

/// Outbound side of the chat platform.
///
/// Implementations never panic; every failure comes back as
/// `transport-error / send-failed`.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef>;

    async fn send_file(
        &self,
        conversation: ConversationId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef>;

    async fn send_progress(&self, conversation: ConversationId, kind: ProgressKind) -> DomainResult<()>;
}

/// Sends through the Telegram Bot API.
#[derive(Clone)]
pub struct TeloxideTransport {
    bot: Bot,
}

impl TeloxideTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn send_failed(operation: &str, conversation: ConversationId, err: RequestError) -> DomainError {
    log::error!("Telegram {} to chat {} failed: {}", operation, conversation, err);
    DomainError::new(ErrorCode::SendFailed, err.to_string())
        .with_context("operation", operation)
        .with_context("chat_id", conversation)
}

#[async_trait]
impl MessagingTransport for TeloxideTransport {
    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef> {
        let mut request = self.bot.send_message(ChatId(conversation.0), text);
        if let Some(reply) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply.0)));
        }

        let sent = request
            .await
            .map_err(|e| send_failed("send_message", conversation, e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn send_file(
        &self,
        conversation: ConversationId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageRef>,
    ) -> DomainResult<MessageRef> {
        let mut request = self
            .bot
            .send_video(ChatId(conversation.0), InputFile::file(path.to_path_buf()))
            .caption(caption)
            .supports_streaming(true);
        if let Some(reply) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply.0)));
        }

        let sent = request
            .await
            .map_err(|e| send_failed("send_video", conversation, e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn send_progress(&self, conversation: ConversationId, kind: ProgressKind) -> DomainResult<()> {
        self.bot
            .send_chat_action(ChatId(conversation.0), kind.chat_action())
            .await
            .map_err(|e| send_failed("send_chat_action", conversation, e))?;
        Ok(())
    }
}
