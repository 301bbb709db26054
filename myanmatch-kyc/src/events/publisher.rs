use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::KycRequest;

pub async fn publish_kyc_decided(rabbitmq: &RabbitMQClient, request: &KycRequest, approved: bool) {
    let event = Event::new(
        "myanmatch-kyc",
        routing_keys::KYC_DECIDED,
        payloads::KycDecided {
            request_id: request.id,
            user_id: request.user_id,
            approved,
            decided_by: request.decided_by.unwrap_or_default(),
        },
    )
    .with_user(request.user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::KYC_DECIDED, &event).await {
        tracing::error!(error = %e, "failed to publish kyc.decided event");
    }
}
