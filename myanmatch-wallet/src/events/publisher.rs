use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{tx_kind, Swap, UserGift, WalletTransaction};

pub async fn publish_transaction_decided(
    rabbitmq: &RabbitMQClient,
    tx: &WalletTransaction,
    approved: bool,
) {
    let routing_key = match (tx.kind.as_str(), approved) {
        (tx_kind::DEPOSIT, true) => routing_keys::WALLET_DEPOSIT_APPROVED,
        (tx_kind::DEPOSIT, false) => routing_keys::WALLET_DEPOSIT_REJECTED,
        (_, true) => routing_keys::WALLET_WITHDRAWAL_APPROVED,
        (_, false) => routing_keys::WALLET_WITHDRAWAL_REJECTED,
    };

    let event = Event::new(
        "myanmatch-wallet",
        routing_key,
        payloads::TransactionDecided {
            transaction_id: tx.id,
            user_id: tx.user_id,
            kind: tx.kind.clone(),
            coin_amount: tx.coin_amount,
            decided_by: tx.decided_by.unwrap_or_default(),
        },
    )
    .with_user(tx.user_id);

    if let Err(e) = rabbitmq.publish(routing_key, &event).await {
        tracing::error!(error = %e, "failed to publish transaction decision event");
    }
}

pub async fn publish_gift_sent(rabbitmq: &RabbitMQClient, user_gift: &UserGift, price_coins: i64) {
    let event = Event::new(
        "myanmatch-wallet",
        routing_keys::WALLET_GIFT_SENT,
        payloads::GiftSent {
            user_gift_id: user_gift.id,
            gift_id: user_gift.gift_id,
            from_user_id: user_gift.from_user_id,
            to_user_id: user_gift.to_user_id,
            price_coins,
        },
    )
    .with_user(user_gift.from_user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::WALLET_GIFT_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish gift.sent event");
    }
}

pub async fn publish_gift_swapped(rabbitmq: &RabbitMQClient, swap: &Swap) {
    let event = Event::new(
        "myanmatch-wallet",
        routing_keys::WALLET_GIFT_SWAPPED,
        payloads::GiftSwapped {
            user_gift_id: swap.user_gift_id,
            user_id: swap.user_id,
            coin_amount: swap.coin_amount,
        },
    )
    .with_user(swap.user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::WALLET_GIFT_SWAPPED, &event).await {
        tracing::error!(error = %e, "failed to publish gift.swapped event");
    }
}
