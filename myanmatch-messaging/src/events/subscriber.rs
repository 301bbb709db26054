use std::sync::Arc;

use diesel::prelude::*;
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Conversation, NewConversation};
use crate::schema::conversations;
use crate::AppState;

/// Every match gets a conversation; listen for match.created and create it.
pub async fn listen_match_created(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "myanmatch-messaging.user.match.created",
            &[routing_keys::USER_MATCH_CREATED],
        )
        .await?;

    tracing::info!("listening for match.created events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::MatchCreated>>(&delivery.data) {
                    Ok(event) => {
                        if let Err(e) = create_conversation(&state, &event.data) {
                            tracing::error!(
                                error = %e,
                                match_id = %event.data.match_id,
                                "failed to create conversation"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize match.created event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}

fn create_conversation(state: &Arc<AppState>, data: &payloads::MatchCreated) -> anyhow::Result<()> {
    let mut conn = state.db.get()?;

    // Redelivered events must not create duplicates
    let existing = conversations::table
        .filter(conversations::match_id.eq(data.match_id))
        .first::<Conversation>(&mut conn)
        .optional()?;

    if existing.is_some() {
        return Ok(());
    }

    let conv = diesel::insert_into(conversations::table)
        .values(&NewConversation {
            match_id: data.match_id,
            user_a: data.user_a,
            user_b: data.user_b,
        })
        .get_result::<Conversation>(&mut conn)?;

    tracing::info!(conversation_id = %conv.id, match_id = %data.match_id, "conversation created");

    Ok(())
}
