use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Html => "html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved mention as sent alongside the message body.
///
/// `id` correlates with the `<at id="N">` span embedded in the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    #[serde(rename = "id")]
    pub sequence_id: usize,
    #[serde(rename = "mentionText")]
    pub display_text: String,
    #[serde(rename = "mentioned")]
    pub target: MentionTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MentionTarget {
    User(UserTarget),
    Conversation(ConversationTarget),
}

impl MentionTarget {
    pub fn is_user(&self) -> bool {
        matches!(self, MentionTarget::User(_))
    }

    pub fn is_conversation(&self) -> bool {
        matches!(self, MentionTarget::Conversation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTarget {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTarget {
    pub id: String,
    pub display_name: String,
    #[serde(rename = "conversationIdentityType")]
    pub kind: ConversationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Channel,
}

/// Payload handed to a transport sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub content: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<MentionRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody<'a> {
    pub content: &'a str,
    pub content_type: ContentType,
}

/// Request body for the chat-message endpoints.
#[derive(Serialize)]
pub struct ChatMessageRequest<'a> {
    pub body: ItemBody<'a>,
    #[serde(skip_serializing_if = "no_mentions")]
    pub mentions: &'a [MentionRecord],
}

fn no_mentions(mentions: &&[MentionRecord]) -> bool {
    mentions.is_empty()
}

impl<'a> From<&'a OutgoingMessage> for ChatMessageRequest<'a> {
    fn from(message: &'a OutgoingMessage) -> Self {
        Self {
            body: ItemBody {
                content: &message.content,
                content_type: message.content_type,
            },
            mentions: &message.mentions,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_record_uses_chat_message_field_names() {
        let record = MentionRecord {
            sequence_id: 0,
            display_text: "John Doe".to_string(),
            target: MentionTarget::User(UserTarget {
                id: "u1".to_string(),
            }),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "id": 0,
                "mentionText": "John Doe",
                "mentioned": { "user": { "id": "u1" } }
            })
        );
    }

    #[test]
    fn channel_record_carries_identity_type() {
        let record = MentionRecord {
            sequence_id: 3,
            display_text: "General".to_string(),
            target: MentionTarget::Conversation(ConversationTarget {
                id: "19:abc@thread.tacv2".to_string(),
                display_name: "General".to_string(),
                kind: ConversationKind::Channel,
            }),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "id": 3,
                "mentionText": "General",
                "mentioned": {
                    "conversation": {
                        "id": "19:abc@thread.tacv2",
                        "displayName": "General",
                        "conversationIdentityType": "channel"
                    }
                }
            })
        );
    }

    #[test]
    fn outgoing_message_omits_empty_mentions() {
        let message = OutgoingMessage {
            content: "hello".to_string(),
            content_type: ContentType::Text,
            mentions: Vec::new(),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "content": "hello", "contentType": "text" })
        );

        let request = ChatMessageRequest::from(&message);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "body": { "content": "hello", "contentType": "text" } })
        );
    }

    #[test]
    fn chat_message_request_wraps_body_and_mentions() {
        let message = OutgoingMessage {
            content: "<at id=\"0\">Ann</at>".to_string(),
            content_type: ContentType::Html,
            mentions: vec![MentionRecord {
                sequence_id: 0,
                display_text: "Ann".to_string(),
                target: MentionTarget::User(UserTarget {
                    id: "u9".to_string(),
                }),
            }],
        };

        let value = serde_json::to_value(ChatMessageRequest::from(&message)).unwrap();
        assert_eq!(value["body"]["contentType"], "html");
        assert_eq!(value["mentions"][0]["mentioned"]["user"]["id"], "u9");
    }
}
