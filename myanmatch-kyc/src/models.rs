use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::kyc_requests;

pub mod kyc_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const DENIED: &str = "denied";
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = kyc_requests)]
pub struct KycRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub selfie_front_url: String,
    pub selfie_holding_url: String,
    pub avatar_snapshot_hash: String,
    pub status: String,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub denial_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = kyc_requests)]
pub struct NewKycRequest {
    pub user_id: Uuid,
    pub selfie_front_url: String,
    pub selfie_holding_url: String,
    pub avatar_snapshot_hash: String,
    pub status: String,
}
