//! Thin HTTP client for the chat service: user lookups and message posting.
//!
//! Token acquisition is out of scope; callers pass a ready bearer token.

use crate::api::{ChatMessageRequest, ChatMessageResponse, OutgoingMessage, UserResponse};
use crate::core::compose::{DeliveryReceipt, Destination, MessageSink, TransportError};
use crate::core::mention::{DirectoryLookup, LookupError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::error::Error;
use tracing::debug;

pub const ACCESS_TOKEN_ENV: &str = "GRAPH_ACCESS_TOKEN";

#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl GraphClient {
    /// Fails when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, Box<dyn Error>> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(format!("Invalid API base URL: {base_url}").into());
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Builds a client from `GRAPH_ACCESS_TOKEN`; `None` when it is unset or empty.
    pub fn from_env(base_url: &str) -> Result<Option<Self>, Box<dyn Error>> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Self::new(base_url, token.trim()).map(Some),
            _ => Ok(None),
        }
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn user_url(&self, entity_id: &str) -> Url {
        self.endpoint(&["users", entity_id])
    }

    pub fn user_lookup_url(&self, entity_id: &str) -> Url {
        let mut url = self.user_url(entity_id);
        url.query_pairs_mut().append_pair("$select", "id,displayName");
        url
    }

    pub fn messages_url(&self, destination: &Destination) -> Url {
        match destination {
            Destination::Channel {
                team_id,
                channel_id,
            } => self.endpoint(&[
                "teams",
                team_id.as_str(),
                "channels",
                channel_id.as_str(),
                "messages",
            ]),
            Destination::Chat { chat_id } => {
                self.endpoint(&["chats", chat_id.as_str(), "messages"])
            }
        }
    }
}

/// Reads the display name from a user response; blank names count as missing.
pub fn display_name_from(response: UserResponse) -> Result<String, LookupError> {
    response
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(LookupError::NotFound)
}

#[async_trait]
impl DirectoryLookup for GraphClient {
    async fn lookup_display_name(&self, entity_id: &str) -> Result<String, LookupError> {
        let url = self.user_lookup_url(entity_id);
        debug!(%url, "Looking up user display name");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| LookupError::Request(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound),
            status if !status.is_success() => {
                return Err(LookupError::Request(format!("HTTP {}", status.as_u16())))
            }
            _ => {}
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Request(err.to_string()))?;
        display_name_from(user)
    }
}

#[async_trait]
impl MessageSink for GraphClient {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, TransportError> {
        let url = self.messages_url(destination);
        debug!(
            %url,
            content_type = %message.content_type,
            mentions = message.mentions.len(),
            "Posting message"
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&ChatMessageRequest::from(message))
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: ChatMessageResponse = response
            .json()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(DeliveryReceipt {
            message_id: created.id,
        })
    }
}
