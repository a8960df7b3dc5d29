use super::*;
use crate::api::MentionTarget;
use crate::core::mention::{LookupError, OfflineDirectory, ReferenceViolation};
use std::collections::HashMap;
use std::sync::Mutex;

struct StaticDirectory(HashMap<String, String>);

impl StaticDirectory {
    fn arc(entries: &[(&str, &str)]) -> Arc<dyn DirectoryLookup> {
        Arc::new(Self(
            entries
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        ))
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn lookup_display_name(&self, entity_id: &str) -> Result<String, LookupError> {
        self.0.get(entity_id).cloned().ok_or(LookupError::NotFound)
    }
}

#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<(Destination, OutgoingMessage)>>,
    fail_with: Option<u16>,
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(
        &self,
        destination: &Destination,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, TransportError> {
        if let Some(status) = self.fail_with {
            return Err(TransportError::Status {
                status,
                body: "nope".to_string(),
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .push((destination.clone(), message.clone()));
        Ok(DeliveryReceipt {
            message_id: Some("m-1".to_string()),
        })
    }
}

fn channel_destination() -> Destination {
    Destination::Channel {
        team_id: "t1".to_string(),
        channel_id: "19:abc@thread.tacv2".to_string(),
    }
}

#[tokio::test]
async fn plain_text_without_mentions_stays_text() {
    let composer = MessageComposer::new(Arc::new(OfflineDirectory));
    let composed = composer
        .compose(&ComposeRequest::new("a < b", MessageFormat::Text))
        .await
        .unwrap();

    assert_eq!(composed.message.content, "a < b");
    assert_eq!(composed.message.content_type, ContentType::Text);
    assert!(composed.message.mentions.is_empty());
    assert!(composed.warnings.is_empty());
}

#[tokio::test]
async fn quoted_user_mention_in_text_becomes_html() {
    let composer = MessageComposer::new(StaticDirectory::arc(&[("u1", "John Doe")]));
    let request = ComposeRequest::new(r#"Hi @"John Doe"!"#, MessageFormat::Text)
        .with_mentions(vec![RawReferenceInput::user("John Doe", "u1")]);

    let composed = composer.compose(&request).await.unwrap();

    assert_eq!(composed.message.content, r#"Hi <at id="0">John Doe</at>!"#);
    assert_eq!(composed.message.content_type, ContentType::Html);
    assert_eq!(composed.message.mentions.len(), 1);
    assert_eq!(composed.message.mentions[0].sequence_id, 0);
    assert_eq!(composed.message.mentions[0].display_text, "John Doe");
    assert!(composed.message.mentions[0].target.is_user());
}

#[tokio::test]
async fn markdown_mentions_are_injected_after_rendering() {
    let composer = MessageComposer::new(StaticDirectory::arc(&[("u1", "Ann Lee")]));
    let request = ComposeRequest::new("**Heads up** @ann and @General", MessageFormat::Markdown)
        .with_mentions(vec![
            RawReferenceInput::user("ann", "u1"),
            RawReferenceInput::channel("General", "19:abc@thread.tacv2"),
        ]);

    let composed = composer.compose(&request).await.unwrap();

    assert_eq!(
        composed.message.content,
        r#"<p><strong>Heads up</strong> <at id="0">Ann Lee</at> and <at id="1">General</at></p>"#
    );
    assert!(composed.warnings.is_empty());
}

#[tokio::test]
async fn tokens_with_html_special_characters_are_injected() {
    let composer = MessageComposer::new(StaticDirectory::arc(&[("u1", "Q&A Team")]));
    let mentions = vec![
        RawReferenceInput::channel("R&D", "19:rd@thread.tacv2"),
        RawReferenceInput::user("Q&A team", "u1"),
    ];

    let text = composer
        .compose(
            &ComposeRequest::new(r#"ping @R&D and @"Q&A team""#, MessageFormat::Text)
                .with_mentions(mentions.clone()),
        )
        .await
        .unwrap();
    assert_eq!(
        text.message.content,
        r#"ping <at id="0">R&D</at> and <at id="1">Q&A Team</at>"#
    );
    assert_eq!(text.message.mentions.len(), 2);

    let markdown = composer
        .compose(
            &ComposeRequest::new(r#"ping @R&D and @"Q&A team""#, MessageFormat::Markdown)
                .with_mentions(mentions),
        )
        .await
        .unwrap();
    assert_eq!(
        markdown.message.content,
        r#"<p>ping <at id="0">R&D</at> and <at id="1">Q&A Team</at></p>"#
    );
    assert_eq!(markdown.message.mentions.len(), 2);
}

#[tokio::test]
async fn record_order_follows_input_even_when_text_order_differs() {
    let composer = MessageComposer::new(StaticDirectory::arc(&[("u1", "Ann")]));
    let request = ComposeRequest::new("@General first, then @ann", MessageFormat::Text)
        .with_mentions(vec![
            RawReferenceInput::user("ann", "u1"),
            RawReferenceInput::channel("General", "c1"),
        ]);

    let composed = composer.compose(&request).await.unwrap();
    let mentions = &composed.message.mentions;

    assert_eq!(mentions[0].sequence_id, 0);
    assert!(matches!(mentions[0].target, MentionTarget::User(_)));
    assert_eq!(mentions[1].sequence_id, 1);
    assert!(matches!(mentions[1].target, MentionTarget::Conversation(_)));
    // "c1" is not a 19:...@thread.tacv2 id
    assert_eq!(composed.warnings.len(), 1);
}

#[tokio::test]
async fn malformed_mentions_fail_the_whole_request() {
    let composer = MessageComposer::new(Arc::new(OfflineDirectory));
    let request = ComposeRequest::new("@a @b", MessageFormat::Text).with_mentions(vec![
        RawReferenceInput::user("a", "u1"),
        RawReferenceInput {
            token: "b".to_string(),
            user_entity_id: Some("u2".to_string()),
            channel_entity_id: Some("c2".to_string()),
        },
    ]);

    match composer.compose(&request).await {
        Err(ComposeError::Malformed(err)) => {
            assert_eq!(err.violation, ReferenceViolation::BothPresent);
            assert_eq!(err.token, "b");
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[tokio::test]
async fn lookup_failure_degrades_instead_of_failing() {
    let composer = MessageComposer::new(Arc::new(OfflineDirectory));
    let request = ComposeRequest::new("@bob", MessageFormat::Text)
        .with_mentions(vec![RawReferenceInput::user("bob", "u2")]);

    let composed = composer.compose(&request).await.unwrap();

    assert_eq!(composed.message.content, r#"<at id="0">bob</at>"#);
    assert_eq!(composed.warnings.len(), 1);
}

#[tokio::test]
async fn send_delivers_composed_payload() {
    let composer = MessageComposer::new(StaticDirectory::arc(&[("u1", "Ann")]));
    let sink = RecordingSink::default();
    let request = ComposeRequest::new("hey @ann", MessageFormat::Text)
        .with_mentions(vec![RawReferenceInput::user("ann", "u1")]);

    let (composed, receipt) = composer
        .send(&sink, &channel_destination(), &request)
        .await
        .unwrap();

    assert_eq!(receipt.message_id.as_deref(), Some("m-1"));
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, channel_destination());
    assert_eq!(delivered[0].1, composed.message);
}

#[tokio::test]
async fn transport_errors_surface() {
    let composer = MessageComposer::new(Arc::new(OfflineDirectory));
    let sink = RecordingSink {
        fail_with: Some(403),
        ..Default::default()
    };

    let err = composer
        .send(
            &sink,
            &Destination::Chat {
                chat_id: "19:chat".to_string(),
            },
            &ComposeRequest::new("hi", MessageFormat::Text),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ComposeError::Transport(TransportError::Status { status: 403, .. })
    ));
}
