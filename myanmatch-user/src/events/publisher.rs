use uuid::Uuid;

use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Like, Match};

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, profile_id: Uuid, credential_id: Uuid) {
    let event = Event::new(
        "myanmatch-user",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated {
            profile_id,
            credential_id,
        },
    )
    .with_user(credential_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_PROFILE_UPDATED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}

pub async fn publish_account_deleted(rabbitmq: &RabbitMQClient, credential_id: Uuid) {
    let event = Event::new(
        "myanmatch-user",
        routing_keys::USER_ACCOUNT_DELETED,
        payloads::AccountDeleted { credential_id },
    )
    .with_user(credential_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_ACCOUNT_DELETED, &event).await {
        tracing::error!(error = %e, "failed to publish account.deleted event");
    }
}

pub async fn publish_like_sent(rabbitmq: &RabbitMQClient, like: &Like, sender_credential_id: Uuid) {
    let event = Event::new(
        "myanmatch-user",
        routing_keys::USER_LIKE_SENT,
        payloads::LikeSent {
            like_id: like.id,
            from_user_id: like.from_profile_id,
            to_user_id: like.to_profile_id,
            like_type: like.like_type.clone(),
            gift_id: like.gift_id,
        },
    )
    .with_user(sender_credential_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_LIKE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish like.sent event");
    }
}

pub async fn publish_match_created(rabbitmq: &RabbitMQClient, created: &Match) {
    let event = Event::new(
        "myanmatch-user",
        routing_keys::USER_MATCH_CREATED,
        payloads::MatchCreated {
            match_id: created.id,
            user_a: created.user_a,
            user_b: created.user_b,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::USER_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_boost_activated(
    rabbitmq: &RabbitMQClient,
    credential_id: Uuid,
    expires_at: chrono::DateTime<chrono::Utc>,
) {
    let event = Event::new(
        "myanmatch-user",
        routing_keys::USER_BOOST_ACTIVATED,
        payloads::BoostActivated {
            credential_id,
            expires_at,
        },
    )
    .with_user(credential_id);

    if let Err(e) = rabbitmq.publish(routing_keys::USER_BOOST_ACTIVATED, &event).await {
        tracing::error!(error = %e, "failed to publish boost.activated event");
    }
}
