use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;
use uuid::Uuid;

use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::services::profile_service;
use crate::AppState;

/// Listen for auth.user.registered events: create the default profile and
/// seed the welcome likes (the first-open likes screen should not be empty).
pub async fn listen_user_registered(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "myanmatch-user.auth.user.registered",
            &[routing_keys::AUTH_USER_REGISTERED],
        )
        .await?;

    tracing::info!("listening for auth.user.registered events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::UserRegistered>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            credential_id = %data.credential_id,
                            "received user.registered event"
                        );

                        match profile_service::create_default_profile(&state.db, data.credential_id) {
                            Ok(profile) => {
                                if let Err(e) = profile_service::seed_welcome_likes(
                                    &state.db,
                                    profile.id,
                                    state.config.welcome_likes_count,
                                ) {
                                    tracing::error!(
                                        error = %e,
                                        profile_id = %profile.id,
                                        "failed to seed welcome likes"
                                    );
                                }
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    credential_id = %data.credential_id,
                                    "failed to create default profile"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize user.registered event");
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

/// Listen for moderation block/release events and mirror the flag onto the
/// profile so the feed and public lookups exclude blocked users locally.
pub async fn listen_moderation_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "myanmatch-user.moderation.user",
            &[
                routing_keys::MODERATION_USER_BLOCKED,
                routing_keys::MODERATION_USER_RELEASED,
            ],
        )
        .await?;

    tracing::info!("listening for moderation block/release events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<serde_json::Value>>(&delivery.data) {
                    Ok(event) => {
                        let user_id = event
                            .data
                            .get("user_id")
                            .and_then(|v| v.as_str())
                            .and_then(|s| Uuid::parse_str(s).ok());

                        match user_id {
                            Some(user_id) => {
                                let blocked =
                                    event.event_type == routing_keys::MODERATION_USER_BLOCKED;
                                if let Err(e) =
                                    profile_service::set_blocked(&state.db, user_id, blocked)
                                {
                                    tracing::error!(
                                        error = %e,
                                        user_id = %user_id,
                                        blocked,
                                        "failed to update blocked flag"
                                    );
                                } else {
                                    tracing::info!(user_id = %user_id, blocked, "blocked flag updated");
                                }
                            }
                            None => {
                                tracing::error!(
                                    event_type = %event.event_type,
                                    "moderation event without a user_id"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize moderation event");
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
