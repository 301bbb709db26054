use uuid::Uuid;

use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Block, Report};

pub async fn publish_report_created(rabbitmq: &RabbitMQClient, report: &Report) {
    let event = Event::new(
        "myanmatch-moderation",
        routing_keys::MODERATION_REPORT_CREATED,
        payloads::ReportCreated {
            report_id: report.id,
            reporter_id: report.reporter_id,
            reported_user_id: report.reported_user_id,
            reason: report.reason.clone(),
        },
    )
    .with_user(report.reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_REPORT_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish report.created event");
    }
}

pub async fn publish_user_blocked(rabbitmq: &RabbitMQClient, block: &Block) {
    let event = Event::new(
        "myanmatch-moderation",
        routing_keys::MODERATION_USER_BLOCKED,
        payloads::UserBlocked {
            user_id: block.user_id,
            blocked_by: block.blocked_by,
            reason: block.reason.clone(),
        },
    )
    .with_user(block.user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_USER_BLOCKED, &event).await {
        tracing::error!(error = %e, "failed to publish user.blocked event");
    }
}

pub async fn publish_user_released(rabbitmq: &RabbitMQClient, user_id: Uuid, released_by: Uuid) {
    let event = Event::new(
        "myanmatch-moderation",
        routing_keys::MODERATION_USER_RELEASED,
        payloads::UserReleased {
            user_id,
            released_by,
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MODERATION_USER_RELEASED, &event).await {
        tracing::error!(error = %e, "failed to publish user.released event");
    }
}
