use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{gifts_catalog, swaps, user_gifts, wallet_transactions, wallets};

// --- Wallet ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = wallets)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coin_balance: i64,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = wallets)]
pub struct NewWallet {
    pub user_id: Uuid,
}

// --- Wallet transaction ---

pub mod tx_kind {
    pub const DEPOSIT: &str = "deposit";
    pub const WITHDRAWAL: &str = "withdrawal";
}

pub mod tx_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = wallet_transactions)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub coin_amount: i64,
    pub status: String,
    pub proof_url: Option<String>,
    pub payout_method: Option<String>,
    pub payout_address: Option<String>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = wallet_transactions)]
pub struct NewWalletTransaction {
    pub user_id: Uuid,
    pub kind: String,
    pub coin_amount: i64,
    pub status: String,
    pub proof_url: Option<String>,
    pub payout_method: Option<String>,
    pub payout_address: Option<String>,
}

// --- Gift catalog ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = gifts_catalog)]
pub struct Gift {
    pub id: Uuid,
    pub name: String,
    pub price_coins: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = gifts_catalog)]
pub struct NewGift {
    pub name: String,
    pub price_coins: i64,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = gifts_catalog)]
pub struct UpdateGift {
    pub name: Option<String>,
    pub price_coins: Option<i64>,
    pub is_active: Option<bool>,
}

// --- User gift ---

pub mod gift_status {
    pub const SENT: &str = "sent";
    pub const SWAPPED: &str = "swapped";
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_gifts)]
pub struct UserGift {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_gifts)]
pub struct NewUserGift {
    pub gift_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: String,
}

// --- Swap ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = swaps)]
pub struct Swap {
    pub id: Uuid,
    pub user_gift_id: Uuid,
    pub user_id: Uuid,
    pub coin_amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swaps)]
pub struct NewSwap {
    pub user_gift_id: Uuid,
    pub user_id: Uuid,
    pub coin_amount: i64,
}
