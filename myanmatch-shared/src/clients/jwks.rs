use std::sync::OnceLock;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{
    AppMetadata, Claims, ClaimsError, IMPERSONATION_ISSUER, TOKEN_AUDIENCE,
};

/// How long a fetched key set is trusted before a missing kid triggers a
/// refetch.
const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

static VERIFIER: OnceLock<JwtVerifier> = OnceLock::new();

/// Install the process-wide verifier. Called once from each service's main
/// before the router is built; the auth extractors read it from here so they
/// stay state-free.
pub fn init_jwt_verifier(verifier: JwtVerifier) {
    if VERIFIER.set(verifier).is_err() {
        tracing::warn!("jwt verifier already initialized");
    }
}

pub fn jwt_verifier() -> Result<&'static JwtVerifier, AppError> {
    VERIFIER
        .get()
        .ok_or_else(|| AppError::internal("jwt verifier not initialized"))
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Verifies bearer tokens against the identity provider's JWKS.
///
/// Provider tokens are RS256/ES256 and resolved by `kid`; admin impersonation
/// links are HS256 under an internal secret and must carry the internal
/// issuer. Key sets are cached and refetched when an unknown `kid` shows up
/// after the refresh interval.
pub struct JwtVerifier {
    http: reqwest::Client,
    jwks_url: Option<String>,
    impersonation_secret: String,
    keys: RwLock<Option<CachedKeys>>,
}

impl JwtVerifier {
    pub fn new(jwks_url: Option<String>, impersonation_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            jwks_url,
            impersonation_secret: impersonation_secret.into(),
            keys: RwLock::new(None),
        }
    }

    /// Build the verifier and warm the key cache. A failed initial fetch is
    /// logged and retried lazily on first use.
    pub async fn connect(jwks_url: &str, impersonation_secret: impl Into<String>) -> Self {
        let verifier = Self::new(Some(jwks_url.to_string()), impersonation_secret);
        match verifier.fetch_keys().await {
            Ok(set) => {
                let count = set.keys.len();
                *verifier.keys.write().await = Some(CachedKeys {
                    set,
                    fetched_at: Instant::now(),
                });
                tracing::info!(url = %jwks_url, keys = count, "JWKS fetched");
            }
            Err(e) => {
                tracing::warn!(url = %jwks_url, error = %e, "initial JWKS fetch failed");
            }
        }
        verifier
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")))?;

        let claims = match header.alg {
            Algorithm::HS256 => self.verify_impersonation(token)?,
            Algorithm::RS256 | Algorithm::ES256 => {
                let kid = header.kid.ok_or_else(|| {
                    AppError::new(ErrorCode::UnknownKeyId, "token header carries no kid")
                })?;
                let jwk = self.key_for(&kid).await?;
                let key = DecodingKey::from_jwk(&jwk)
                    .map_err(|e| AppError::new(ErrorCode::TokenInvalid, format!("bad jwk: {e}")))?;
                decode_claims(token, &key, header.alg)?
            }
            other => {
                return Err(AppError::new(
                    ErrorCode::TokenInvalid,
                    format!("unsupported token algorithm: {other:?}"),
                ));
            }
        };

        claims.validate_registered().map_err(claims_error)?;
        Ok(claims)
    }

    fn verify_impersonation(&self, token: &str) -> Result<Claims, AppError> {
        let key = DecodingKey::from_secret(self.impersonation_secret.as_bytes());
        let claims = decode_claims(token, &key, Algorithm::HS256)?;
        if !claims.is_impersonation() {
            return Err(AppError::new(
                ErrorCode::WrongIssuer,
                "HS256 tokens must come from the impersonation issuer",
            ));
        }
        Ok(claims)
    }

    async fn key_for(&self, kid: &str) -> Result<Jwk, AppError> {
        if let Some(cached) = self.keys.read().await.as_ref() {
            if let Some(jwk) = cached.set.find(kid) {
                return Ok(jwk.clone());
            }
            if cached.fetched_at.elapsed() < JWKS_REFRESH_INTERVAL {
                return Err(AppError::new(
                    ErrorCode::UnknownKeyId,
                    format!("no key with kid {kid}"),
                ));
            }
        }

        // Unknown kid on a stale (or empty) cache: refetch once.
        let set = self.fetch_keys().await?;
        let jwk = set.find(kid).cloned();
        *self.keys.write().await = Some(CachedKeys {
            set,
            fetched_at: Instant::now(),
        });

        jwk.ok_or_else(|| AppError::new(ErrorCode::UnknownKeyId, format!("no key with kid {kid}")))
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AppError> {
        let url = self.jwks_url.as_deref().ok_or_else(|| {
            AppError::new(ErrorCode::JwksUnavailable, "no JWKS endpoint configured")
        })?;

        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::new(ErrorCode::JwksUnavailable, format!("jwks fetch failed: {e}")))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::new(ErrorCode::JwksUnavailable, format!("jwks parse failed: {e}")))
    }
}

fn decode_claims(token: &str, key: &DecodingKey, alg: Algorithm) -> Result<Claims, AppError> {
    let mut validation = Validation::new(alg);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidAudience => {
            AppError::new(ErrorCode::WrongAudience, "token audience mismatch")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(data.claims)
}

fn claims_error(e: ClaimsError) -> AppError {
    match e {
        ClaimsError::WrongAudience => AppError::new(ErrorCode::WrongAudience, "token audience mismatch"),
        ClaimsError::WrongIssuer => AppError::new(ErrorCode::WrongIssuer, "token issuer not trusted"),
        ClaimsError::Expired => AppError::new(ErrorCode::TokenExpired, "token has expired"),
    }
}

/// Mint a short-lived impersonation token for an admin magic link.
pub fn mint_impersonation_token(
    secret: &str,
    target_user: Uuid,
    admin_id: Uuid,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: target_user,
        aud: TOKEN_AUDIENCE.to_string(),
        iss: IMPERSONATION_ISSUER.to_string(),
        email: None,
        role: Some("authenticated".to_string()),
        app_metadata: AppMetadata::default(),
        iat: now,
        exp: now + ttl_secs,
        impersonated_by: Some(admin_id),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("failed to sign impersonation token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-impersonation-secret";

    #[tokio::test]
    async fn impersonation_roundtrip() {
        let verifier = JwtVerifier::new(None, SECRET);
        let admin = Uuid::now_v7();
        let target = Uuid::now_v7();

        let token = mint_impersonation_token(SECRET, target, admin, 600).unwrap();
        let claims = verifier.verify(&token).await.unwrap();

        assert_eq!(claims.sub, target);
        assert_eq!(claims.impersonated_by, Some(admin));
        assert!(claims.is_impersonation());
    }

    #[tokio::test]
    async fn wrong_secret_rejected() {
        let verifier = JwtVerifier::new(None, "a-different-secret");
        let token = mint_impersonation_token(SECRET, Uuid::now_v7(), Uuid::now_v7(), 600).unwrap();
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn expired_impersonation_rejected() {
        let verifier = JwtVerifier::new(None, SECRET);
        let token = mint_impersonation_token(SECRET, Uuid::now_v7(), Uuid::now_v7(), -60).unwrap();
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn hs256_with_foreign_issuer_rejected() {
        // A forged HS256 token that does not claim the impersonation issuer
        // must not pass even when signed with the right secret.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::now_v7(),
            aud: TOKEN_AUDIENCE.to_string(),
            iss: "https://xyz.supabase.co/auth/v1".to_string(),
            email: None,
            role: Some("authenticated".to_string()),
            app_metadata: AppMetadata::default(),
            iat: now,
            exp: now + 600,
            impersonated_by: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let verifier = JwtVerifier::new(None, SECRET);
        assert!(verifier.verify(&token).await.is_err());
    }
}
