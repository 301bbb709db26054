use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::services::ledger;
use crate::AppState;

/// Open a wallet when a user registers, close it when the account is
/// deleted.
pub async fn listen_user_lifecycle(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "myanmatch-wallet.user.lifecycle",
            &[
                routing_keys::AUTH_USER_REGISTERED,
                routing_keys::USER_ACCOUNT_DELETED,
            ],
        )
        .await?;

    tracing::info!("listening for user lifecycle events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<serde_json::Value>>(&delivery.data) {
                    Ok(event) => handle_lifecycle_event(&state, &event),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize lifecycle event");
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

fn handle_lifecycle_event(state: &Arc<AppState>, event: &Event<serde_json::Value>) {
    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "db pool error in lifecycle handler");
            return;
        }
    };

    if event.event_type == routing_keys::AUTH_USER_REGISTERED {
        let Ok(payload) =
            serde_json::from_value::<payloads::UserRegistered>(event.data.clone())
        else {
            tracing::error!("malformed user.registered payload");
            return;
        };
        match ledger::open_wallet(&mut conn, payload.credential_id) {
            Ok(wallet) => {
                tracing::info!(wallet_id = %wallet.id, user_id = %payload.credential_id, "wallet opened");
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %payload.credential_id, "failed to open wallet");
            }
        }
    } else if event.event_type == routing_keys::USER_ACCOUNT_DELETED {
        let Ok(payload) =
            serde_json::from_value::<payloads::AccountDeleted>(event.data.clone())
        else {
            tracing::error!("malformed account.deleted payload");
            return;
        };
        match ledger::close_wallet(&mut conn, payload.credential_id) {
            Ok(_) => {
                tracing::info!(user_id = %payload.credential_id, "wallet closed");
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %payload.credential_id, "failed to close wallet");
            }
        }
    }
}
