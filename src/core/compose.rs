//! Message composition: render, resolve mentions, inject markup, deliver.

use crate::api::{ContentType, OutgoingMessage};
use crate::core::mention::{
    inject_mentions_as, normalize::DEFAULT_LOOKUP_TIMEOUT, normalize_references,
    validate_references, DirectoryLookup, MalformedReferenceError, NormalizeWarning,
    RawReferenceInput,
};
use crate::core::render::{escape_text_as_html, renderer_for, MessageFormat};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Channel { team_id: String, channel_id: String },
    Chat { chat_id: String },
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Channel {
                team_id,
                channel_id,
            } => write!(f, "channel {channel_id} in team {team_id}"),
            Destination::Chat { chat_id } => write!(f, "chat {chat_id}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

#[derive(Debug)]
pub enum TransportError {
    Request(String),
    Status { status: u16, body: String },
    Io(std::io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "Request failed: {msg}"),
            TransportError::Status { status, body } => {
                write!(f, "Server rejected message (HTTP {status}): {body}")
            }
            TransportError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Accepts a finished payload for delivery.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, TransportError>;
}

/// Prints the payload instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait]
impl MessageSink for DryRunSink {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, TransportError> {
        let json = serde_json::to_string_pretty(message)
            .map_err(|err| TransportError::Io(std::io::Error::other(err)))?;
        println!("# dry run: would post to {destination}");
        println!("{json}");
        Ok(DeliveryReceipt::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeRequest {
    pub text: String,
    pub format: MessageFormat,
    pub mentions: Vec<RawReferenceInput>,
}

impl ComposeRequest {
    pub fn new(text: impl Into<String>, format: MessageFormat) -> Self {
        Self {
            text: text.into(),
            format,
            mentions: Vec::new(),
        }
    }

    pub fn with_mentions(mut self, mentions: Vec<RawReferenceInput>) -> Self {
        self.mentions = mentions;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub message: OutgoingMessage,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug)]
pub enum ComposeError {
    Malformed(MalformedReferenceError),
    Transport(TransportError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::Malformed(err) => write!(f, "Invalid mentions: {err}"),
            ComposeError::Transport(err) => write!(f, "Failed to send message: {err}"),
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComposeError::Malformed(err) => Some(err),
            ComposeError::Transport(err) => Some(err),
        }
    }
}

impl From<MalformedReferenceError> for ComposeError {
    fn from(err: MalformedReferenceError) -> Self {
        ComposeError::Malformed(err)
    }
}

impl From<TransportError> for ComposeError {
    fn from(err: TransportError) -> Self {
        ComposeError::Transport(err)
    }
}

pub struct MessageComposer {
    directory: Arc<dyn DirectoryLookup>,
    lookup_timeout: Duration,
}

impl MessageComposer {
    pub fn new(directory: Arc<dyn DirectoryLookup>) -> Self {
        Self {
            directory,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub async fn compose(&self, request: &ComposeRequest) -> Result<ComposedMessage, ComposeError> {
        let validated = validate_references(&request.mentions)?;
        let has_mentions = !validated.is_empty();

        let rendered = renderer_for(request.format, has_mentions).render(&request.text);
        debug!(
            format = %request.format,
            content_type = %rendered.content_type,
            mentions = validated.len(),
            "Rendered message content"
        );

        if !has_mentions {
            return Ok(ComposedMessage {
                message: OutgoingMessage {
                    content: rendered.content,
                    content_type: rendered.content_type,
                    mentions: Vec::new(),
                },
                warnings: Vec::new(),
            });
        }

        let normalized =
            normalize_references(self.directory.as_ref(), validated, self.lookup_timeout).await;
        // Rendered content is HTML-escaped, so tokens are matched escaped too.
        let (content, mentions) = inject_mentions_as(
            &rendered.content,
            &normalized.references,
            escape_text_as_html,
        );

        Ok(ComposedMessage {
            message: OutgoingMessage {
                content,
                content_type: ContentType::Html,
                mentions,
            },
            warnings: normalized.warnings,
        })
    }

    pub async fn send(
        &self,
        sink: &dyn MessageSink,
        destination: &Destination,
        request: &ComposeRequest,
    ) -> Result<(ComposedMessage, DeliveryReceipt), ComposeError> {
        let composed = self.compose(request).await?;
        let receipt = sink.deliver(destination, &composed.message).await?;
        debug!(
            %destination,
            message_id = receipt.message_id.as_deref().unwrap_or("<none>"),
            "Message delivered"
        );
        Ok((composed, receipt))
    }
}

#[cfg(test)]
mod tests;
