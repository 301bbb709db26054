use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use myanmatch_shared::clients::jwks::jwt_verifier;
use myanmatch_shared::middleware::extract_bearer_token;
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::ApiErrorResponse;

use super::rate_limit::check_rate_limit;
use crate::config::strip_prefix;
use crate::AppState;

/// Headers that must not be forwarded (hop-by-hop), plus the identity
/// headers the gateway owns.
const DROPPED_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    // Never forwarded from the client; rewritten from verified claims
    "x-user-id",
    "x-user-role",
];

/// The catch-all proxy handler.
///
/// 1. Resolve the upstream service (404 if unknown prefix)
/// 2. A present bearer token is verified and rate-limited; its subject is
///    stamped into X-User-Id. A missing token forwards the request in an
///    anonymous state and the upstream's extractors decide.
/// 3. Strip the /api prefix and forward method, headers, query and body
/// 4. Return the upstream response
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(original_uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let path = original_uri.path();
    let query = original_uri.query();

    // 1. Resolve upstream
    let upstream_base = match state.config.resolve_upstream(path) {
        Some(url) => url,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiErrorResponse::new("E0003", "no upstream service for this path")),
            )
                .into_response();
        }
    };

    // 2. Verify the token when one is present; anonymous otherwise
    let auth_user: Option<AuthUser> = match extract_bearer_token(&headers) {
        Ok(Some(token)) => {
            let verifier = match jwt_verifier() {
                Ok(v) => v,
                Err(e) => return e.into_response(),
            };
            match verifier.verify(&token).await {
                Ok(claims) => Some(AuthUser::from(claims)),
                Err(e) => return e.into_response(),
            }
        }
        Ok(None) => None,
        Err(e) => return e.into_response(),
    };

    if let Some(ref user) = auth_user {
        if let Err(status) =
            check_rate_limit(&state.redis, user.id, user.role, &state.config).await
        {
            return (
                status,
                Json(ApiErrorResponse::new("E0006", "rate limit exceeded")),
            )
                .into_response();
        }
    }

    // 3. Build upstream URL
    let upstream_path = strip_prefix(path);
    let upstream_url = match query {
        Some(q) => format!("{upstream_base}{upstream_path}?{q}"),
        None => format!("{upstream_base}{upstream_path}"),
    };

    // Read body (max 25 MB; uploads pass through here)
    let body_bytes = match axum::body::to_bytes(body, 25 * 1024 * 1024).await {
        Ok(b) => b,
        Err(_) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiErrorResponse::new("E0009", "request body too large (max 25MB)")),
            )
                .into_response();
        }
    };

    let mut upstream_req = state
        .http_client
        .request(
            reqwest::Method::from_bytes(method.as_str().as_bytes()).unwrap_or(reqwest::Method::GET),
            &upstream_url,
        )
        .body(body_bytes.to_vec());

    // Forward headers, skipping hop-by-hop and client-asserted identity
    for (name, value) in headers.iter() {
        let name_lower = name.as_str().to_lowercase();
        if DROPPED_HEADERS.contains(&name_lower.as_str()) {
            continue;
        }
        if let Ok(val) = value.to_str() {
            upstream_req = upstream_req.header(name.as_str(), val);
        }
    }

    // Identity comes only from verified claims
    if let Some(ref user) = auth_user {
        upstream_req = upstream_req
            .header("X-User-Id", user.id.to_string())
            .header("X-User-Role", user.role.to_string());
    }

    // 4. Send and return upstream response
    let upstream_resp = match upstream_req.send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, upstream = %upstream_url, "upstream request failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiErrorResponse::new("E0007", format!("upstream unavailable: {e}"))),
            )
                .into_response();
        }
    };

    let status = StatusCode::from_u16(upstream_resp.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response_headers = HeaderMap::new();
    for (name, value) in upstream_resp.headers().iter() {
        let name_lower = name.as_str().to_lowercase();
        if DROPPED_HEADERS.contains(&name_lower.as_str()) {
            continue;
        }
        if let (Ok(hn), Ok(hv)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response_headers.insert(hn, hv);
        }
    }

    let resp_body = match upstream_resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "failed to read upstream response body");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiErrorResponse::new("E0007", "failed to read upstream response")),
            )
                .into_response();
        }
    };

    (status, response_headers, resp_body).into_response()
}
