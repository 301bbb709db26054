use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::clients::jwks::jwt_verifier;
use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, UserRole};

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?
            .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?;
        let claims = jwt_verifier()?.verify(&token).await?;
        Ok(AuthUser::from(claims))
    }
}

/// Pull the bearer token out of the Authorization header.
///
/// `Ok(None)` means no header at all (anonymous request); a malformed header
/// is an error.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let auth_header = match headers.get("Authorization") {
        Some(h) => h,
        None => return Ok(None),
    };

    let auth_header = auth_header
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::new(
            ErrorCode::Unauthorized,
            "authorization header must use Bearer scheme",
        ));
    }

    Ok(Some(auth_header[7..].to_string()))
}

/// Optional auth extractor: a missing token yields an anonymous request state
/// rather than a rejection; a present-but-invalid token still rejects.
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match extract_bearer_token(&parts.headers)? {
            Some(t) => t,
            None => return Ok(Self(None)),
        };
        let claims = jwt_verifier()?.verify(&token).await?;
        Ok(Self(Some(AuthUser::from(claims))))
    }
}

/// Require Admin role
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::new(ErrorCode::Forbidden, "admin access required"));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn no_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).unwrap().is_none());
    }

    #[test]
    fn bearer_token_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            extract_bearer_token(&headers).unwrap().as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn non_bearer_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
