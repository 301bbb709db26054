use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};

#[derive(Debug, Serialize)]
struct DebitRequest {
    user_id: Uuid,
    amount: i64,
    reason: String,
}

#[derive(Debug, Serialize)]
struct SendGiftRequest {
    gift_id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
}

/// Debit coins through the wallet service's internal API.
pub async fn debit_coins(
    http: &reqwest::Client,
    wallet_base: &str,
    user_id: Uuid,
    amount: i64,
    reason: &str,
) -> AppResult<()> {
    let resp = http
        .post(format!("{wallet_base}/internal/coins/debit"))
        .json(&DebitRequest {
            user_id,
            amount,
            reason: reason.to_string(),
        })
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("wallet unreachable: {e}")))?;

    map_wallet_status(resp.status().as_u16(), "coin debit refused")
}

/// Send a gift (debit + ownership record) through the wallet service.
pub async fn send_gift(
    http: &reqwest::Client,
    wallet_base: &str,
    gift_id: Uuid,
    from_user_id: Uuid,
    to_user_id: Uuid,
) -> AppResult<()> {
    let resp = http
        .post(format!("{wallet_base}/internal/gifts/send"))
        .json(&SendGiftRequest {
            gift_id,
            from_user_id,
            to_user_id,
        })
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("wallet unreachable: {e}")))?;

    map_wallet_status(resp.status().as_u16(), "gift send refused")
}

fn map_wallet_status(status: u16, context: &str) -> AppResult<()> {
    match StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR) {
        s if s.is_success() => Ok(()),
        StatusCode::UNPROCESSABLE_ENTITY => Err(AppError::new(
            ErrorCode::InsufficientCoins,
            "not enough coins",
        )),
        StatusCode::NOT_FOUND => Err(AppError::new(ErrorCode::GiftNotFound, context.to_string())),
        s if s.is_client_error() => Err(AppError::bad_request(context.to_string())),
        _ => Err(AppError::new(
            ErrorCode::ServiceUnavailable,
            format!("wallet error: {context}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(map_wallet_status(200, "x").is_ok());
        assert!(matches!(
            map_wallet_status(422, "x"),
            Err(AppError::Known { code: ErrorCode::InsufficientCoins, .. })
        ));
        assert!(matches!(
            map_wallet_status(404, "x"),
            Err(AppError::Known { code: ErrorCode::GiftNotFound, .. })
        ));
        assert!(map_wallet_status(500, "x").is_err());
    }
}
