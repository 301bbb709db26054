use axum::Json;

use myanmatch_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "myanmatch-kyc",
        env!("CARGO_PKG_VERSION"),
    ))
}
