use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience the identity provider stamps on end-user tokens.
pub const TOKEN_AUDIENCE: &str = "authenticated";
/// Substring that must appear in the issuer of provider-signed tokens.
pub const ISSUER_TAG: &str = "supabase";
/// Issuer of admin impersonation magic-link tokens.
pub const IMPERSONATION_ISSUER: &str = "myanmatch-admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Application metadata the provider embeds in its tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Claims carried by provider-issued tokens (and by impersonation tokens,
/// which reuse the same shape with `IMPERSONATION_ISSUER`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub aud: String,
    pub iss: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Provider role string ("authenticated", "service_role").
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
    pub iat: i64,
    pub exp: i64,
    /// Set on impersonation tokens: the admin who minted the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impersonated_by: Option<Uuid>,
}

impl Claims {
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_impersonation(&self) -> bool {
        self.iss == IMPERSONATION_ISSUER
    }

    /// Tokens must carry the `authenticated` audience and come from the
    /// provider (or from the internal impersonation issuer).
    pub fn validate_registered(&self) -> Result<(), ClaimsError> {
        if self.aud != TOKEN_AUDIENCE {
            return Err(ClaimsError::WrongAudience);
        }
        if !self.iss.contains(ISSUER_TAG) && !self.is_impersonation() {
            return Err(ClaimsError::WrongIssuer);
        }
        if self.is_expired() {
            return Err(ClaimsError::Expired);
        }
        Ok(())
    }

    pub fn app_role(&self) -> UserRole {
        if self.app_metadata.role == Some(UserRole::Admin)
            || self.role.as_deref() == Some("service_role")
        {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimsError {
    WrongAudience,
    WrongIssuer,
    Expired,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: UserRole,
    /// Present when the request runs under an admin impersonation link.
    pub impersonated_by: Option<Uuid>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let role = claims.app_role();
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            role,
            impersonated_by: claims.impersonated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(aud: &str, iss: &str, exp_offset: i64) -> Claims {
        Claims {
            sub: Uuid::now_v7(),
            aud: aud.to_string(),
            iss: iss.to_string(),
            email: Some("a@b.test".into()),
            role: Some("authenticated".into()),
            app_metadata: AppMetadata::default(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + exp_offset,
            impersonated_by: None,
        }
    }

    #[test]
    fn provider_claims_validate() {
        let c = claims("authenticated", "https://xyz.supabase.co/auth/v1", 3600);
        assert!(c.validate_registered().is_ok());
    }

    #[test]
    fn wrong_audience_rejected() {
        let c = claims("anon", "https://xyz.supabase.co/auth/v1", 3600);
        assert_eq!(c.validate_registered(), Err(ClaimsError::WrongAudience));
    }

    #[test]
    fn foreign_issuer_rejected() {
        let c = claims("authenticated", "https://evil.example/auth", 3600);
        assert_eq!(c.validate_registered(), Err(ClaimsError::WrongIssuer));
    }

    #[test]
    fn impersonation_issuer_accepted() {
        let mut c = claims("authenticated", IMPERSONATION_ISSUER, 600);
        c.impersonated_by = Some(Uuid::now_v7());
        assert!(c.validate_registered().is_ok());
        assert!(c.is_impersonation());
    }

    #[test]
    fn expired_rejected() {
        let c = claims("authenticated", "https://xyz.supabase.co/auth/v1", -10);
        assert_eq!(c.validate_registered(), Err(ClaimsError::Expired));
    }

    #[test]
    fn service_role_is_admin() {
        let mut c = claims("authenticated", "https://xyz.supabase.co/auth/v1", 3600);
        c.role = Some("service_role".into());
        assert_eq!(c.app_role(), UserRole::Admin);
    }
}
