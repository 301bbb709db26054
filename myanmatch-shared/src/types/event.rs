use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `myanmatch.{domain}.{entity}.{action}`
/// Example: `myanmatch.user.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Auth events (published by the gateway on first sight of a subject)
    pub const AUTH_USER_REGISTERED: &str = "myanmatch.auth.user.registered";

    // User events
    pub const USER_PROFILE_UPDATED: &str = "myanmatch.user.profile.updated";
    pub const USER_ACCOUNT_DELETED: &str = "myanmatch.user.account.deleted";
    pub const USER_LIKE_SENT: &str = "myanmatch.user.like.sent";
    pub const USER_MATCH_CREATED: &str = "myanmatch.user.match.created";
    pub const USER_BOOST_ACTIVATED: &str = "myanmatch.user.boost.activated";

    // Wallet events
    pub const WALLET_DEPOSIT_APPROVED: &str = "myanmatch.wallet.deposit.approved";
    pub const WALLET_DEPOSIT_REJECTED: &str = "myanmatch.wallet.deposit.rejected";
    pub const WALLET_WITHDRAWAL_APPROVED: &str = "myanmatch.wallet.withdrawal.approved";
    pub const WALLET_WITHDRAWAL_REJECTED: &str = "myanmatch.wallet.withdrawal.rejected";
    pub const WALLET_GIFT_SENT: &str = "myanmatch.wallet.gift.sent";
    pub const WALLET_GIFT_SWAPPED: &str = "myanmatch.wallet.gift.swapped";

    // KYC events
    pub const KYC_DECIDED: &str = "myanmatch.kyc.request.decided";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "myanmatch.messaging.message.sent";

    // Moderation events
    pub const MODERATION_REPORT_CREATED: &str = "myanmatch.moderation.report.created";
    pub const MODERATION_USER_BLOCKED: &str = "myanmatch.moderation.user.blocked";
    pub const MODERATION_USER_RELEASED: &str = "myanmatch.moderation.user.released";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub credential_id: Uuid,
        pub email: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        pub credential_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AccountDeleted {
        pub credential_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeSent {
        pub like_id: Uuid,
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub like_type: String,
        pub gift_id: Option<Uuid>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_a: Uuid,
        pub user_b: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BoostActivated {
        pub credential_id: Uuid,
        pub expires_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionDecided {
        pub transaction_id: Uuid,
        pub user_id: Uuid,
        pub kind: String,
        pub coin_amount: i64,
        pub decided_by: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GiftSent {
        pub user_gift_id: Uuid,
        pub gift_id: Uuid,
        pub from_user_id: Uuid,
        pub to_user_id: Uuid,
        pub price_coins: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GiftSwapped {
        pub user_gift_id: Uuid,
        pub user_id: Uuid,
        pub coin_amount: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct KycDecided {
        pub request_id: Uuid,
        pub user_id: Uuid,
        pub approved: bool,
        pub decided_by: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub conversation_id: Uuid,
        pub sender_id: Uuid,
        pub kind: String,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportCreated {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub reported_user_id: Uuid,
        pub reason: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserBlocked {
        pub user_id: Uuid,
        pub blocked_by: Uuid,
        pub reason: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserReleased {
        pub user_id: Uuid,
        pub released_by: Uuid,
    }
}
