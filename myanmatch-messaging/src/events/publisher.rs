use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::Message;

pub async fn publish_message_sent(rabbitmq: &RabbitMQClient, message: &Message) {
    let preview = message
        .content
        .as_deref()
        .unwrap_or("[attachment]")
        .chars()
        .take(80)
        .collect::<String>();

    let event = Event::new(
        "myanmatch-messaging",
        routing_keys::MESSAGING_MESSAGE_SENT,
        payloads::MessageSent {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            kind: message.kind.clone(),
            content_preview: preview,
        },
    )
    .with_user(message.sender_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MESSAGING_MESSAGE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish message.sent event");
    }
}
