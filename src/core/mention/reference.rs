use crate::api::{ConversationKind, ConversationTarget, MentionRecord, MentionTarget, UserTarget};
use serde::{Deserialize, Serialize};

/// Mention input as supplied by a caller, before validation.
///
/// Exactly one of `user_entity_id` / `channel_entity_id` must be set to a
/// non-empty value; see [`super::validate::validate_references`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReferenceInput {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_entity_id: Option<String>,
}

impl RawReferenceInput {
    pub fn user(token: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_entity_id: Some(entity_id.into()),
            channel_entity_id: None,
        }
    }

    pub fn channel(token: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_entity_id: None,
            channel_entity_id: Some(entity_id.into()),
        }
    }

    pub(crate) fn user_id(&self) -> Option<&str> {
        non_empty(self.user_entity_id.as_deref())
    }

    pub(crate) fn channel_id(&self) -> Option<&str> {
        non_empty(self.channel_entity_id.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A reference that passed validation but has no display label yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedReference {
    User { token: String, entity_id: String },
    Channel { token: String, entity_id: String },
}

impl ValidatedReference {
    pub fn token(&self) -> &str {
        match self {
            ValidatedReference::User { token, .. } | ValidatedReference::Channel { token, .. } => {
                token
            }
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            ValidatedReference::User { entity_id, .. }
            | ValidatedReference::Channel { entity_id, .. } => entity_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReference {
    pub token: String,
    pub entity_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReference {
    pub token: String,
    pub entity_id: String,
    pub label: String,
}

/// A fully displayable mention of either a user or a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    User(UserReference),
    Channel(ChannelReference),
}

impl Reference {
    pub fn user(
        token: impl Into<String>,
        entity_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Reference::User(UserReference {
            token: token.into(),
            entity_id: entity_id.into(),
            label: label.into(),
        })
    }

    pub fn channel(
        token: impl Into<String>,
        entity_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Reference::Channel(ChannelReference {
            token: token.into(),
            entity_id: entity_id.into(),
            label: label.into(),
        })
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Reference::User(_))
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Reference::Channel(_))
    }

    pub fn token(&self) -> &str {
        match self {
            Reference::User(user) => &user.token,
            Reference::Channel(channel) => &channel.token,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Reference::User(user) => &user.entity_id,
            Reference::Channel(channel) => &channel.entity_id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Reference::User(user) => &user.label,
            Reference::Channel(channel) => &channel.label,
        }
    }

    /// Builds the wire record for this reference at `sequence_id`.
    pub fn to_record(&self, sequence_id: usize) -> MentionRecord {
        let target = match self {
            Reference::User(user) => MentionTarget::User(UserTarget {
                id: user.entity_id.clone(),
            }),
            Reference::Channel(channel) => MentionTarget::Conversation(ConversationTarget {
                id: channel.entity_id.clone(),
                display_name: channel.label.clone(),
                kind: ConversationKind::Channel,
            }),
        };

        MentionRecord {
            sequence_id,
            display_text: self.label().to_string(),
            target,
        }
    }
}
