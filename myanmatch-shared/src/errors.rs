use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth/gateway errors
/// - E2xxx: User/profile/swipe errors
/// - E3xxx: Feed/match errors
/// - E4xxx: Wallet errors
/// - E5xxx: KYC errors
/// - E6xxx: Moderation errors
/// - E7xxx: Messaging errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    PayloadTooLarge,

    // Auth/gateway (E1xxx)
    TokenExpired,
    TokenInvalid,
    JwksUnavailable,
    UnknownKeyId,
    WrongAudience,
    WrongIssuer,
    UserBlocked,

    // User (E2xxx)
    ProfileNotFound,
    InvalidUser,
    DisplayNameTaken,
    InvalidDisplayName,
    MediaUploadFailed,
    OnboardingIncomplete,
    LikeIdentityMismatch,
    CannotLikeSelf,
    DailyLikeQuotaReached,
    LikeNotFound,
    PreferencesNotFound,

    // Feed/match (E3xxx)
    MatchNotFound,
    BoostAlreadyActive,

    // Wallet (E4xxx)
    WalletNotFound,
    WalletClosed,
    InsufficientCoins,
    TransactionNotFound,
    TransactionAlreadyDecided,
    GiftNotFound,
    GiftNotActive,
    GiftNotReceived,
    GiftAlreadySwapped,
    InvalidAmount,

    // KYC (E5xxx)
    KycRequestNotFound,
    KycAlreadyPending,
    KycAlreadyDecided,
    AvatarMismatch,
    SelfieMissing,

    // Moderation (E6xxx)
    ReportNotFound,
    ReportAlreadyReviewed,
    CannotReportSelf,
    DuplicateReport,
    BlockNotFound,
    AlreadyBlocked,

    // Messaging (E7xxx)
    ConversationNotFound,
    NotConversationMember,
    MessageNotFound,
    AttachmentMissing,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::PayloadTooLarge => "E0009",

            // Auth/gateway
            Self::TokenExpired => "E1001",
            Self::TokenInvalid => "E1002",
            Self::JwksUnavailable => "E1003",
            Self::UnknownKeyId => "E1004",
            Self::WrongAudience => "E1005",
            Self::WrongIssuer => "E1006",
            Self::UserBlocked => "E1007",

            // User
            Self::ProfileNotFound => "E2001",
            Self::InvalidUser => "E2002",
            Self::DisplayNameTaken => "E2003",
            Self::InvalidDisplayName => "E2004",
            Self::MediaUploadFailed => "E2005",
            Self::OnboardingIncomplete => "E2006",
            Self::LikeIdentityMismatch => "E2007",
            Self::CannotLikeSelf => "E2008",
            Self::DailyLikeQuotaReached => "E2009",
            Self::LikeNotFound => "E2010",
            Self::PreferencesNotFound => "E2011",

            // Feed/match
            Self::MatchNotFound => "E3001",
            Self::BoostAlreadyActive => "E3002",

            // Wallet
            Self::WalletNotFound => "E4001",
            Self::WalletClosed => "E4002",
            Self::InsufficientCoins => "E4003",
            Self::TransactionNotFound => "E4004",
            Self::TransactionAlreadyDecided => "E4005",
            Self::GiftNotFound => "E4006",
            Self::GiftNotActive => "E4007",
            Self::GiftNotReceived => "E4008",
            Self::GiftAlreadySwapped => "E4009",
            Self::InvalidAmount => "E4010",

            // KYC
            Self::KycRequestNotFound => "E5001",
            Self::KycAlreadyPending => "E5002",
            Self::KycAlreadyDecided => "E5003",
            Self::AvatarMismatch => "E5004",
            Self::SelfieMissing => "E5005",

            // Moderation
            Self::ReportNotFound => "E6001",
            Self::ReportAlreadyReviewed => "E6002",
            Self::CannotReportSelf => "E6003",
            Self::DuplicateReport => "E6004",
            Self::BlockNotFound => "E6005",
            Self::AlreadyBlocked => "E6006",

            // Messaging
            Self::ConversationNotFound => "E7001",
            Self::NotConversationMember => "E7002",
            Self::MessageNotFound => "E7003",
            Self::AttachmentMissing => "E7004",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable | Self::JwksUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ValidationError | Self::BadRequest | Self::InvalidDisplayName
            | Self::InvalidAmount | Self::SelfieMissing | Self::AttachmentMissing
            | Self::InvalidUser => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::ProfileNotFound | Self::PreferencesNotFound
            | Self::LikeNotFound | Self::MatchNotFound | Self::WalletNotFound
            | Self::TransactionNotFound | Self::GiftNotFound | Self::KycRequestNotFound
            | Self::ReportNotFound | Self::BlockNotFound | Self::ConversationNotFound
            | Self::MessageNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid
            | Self::UnknownKeyId | Self::WrongAudience | Self::WrongIssuer => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden | Self::UserBlocked | Self::OnboardingIncomplete
            | Self::LikeIdentityMismatch | Self::CannotLikeSelf | Self::CannotReportSelf
            | Self::NotConversationMember | Self::GiftNotReceived | Self::WalletClosed => {
                StatusCode::FORBIDDEN
            }
            Self::RateLimited | Self::DailyLikeQuotaReached => StatusCode::TOO_MANY_REQUESTS,
            Self::DisplayNameTaken | Self::TransactionAlreadyDecided | Self::GiftAlreadySwapped
            | Self::KycAlreadyPending | Self::KycAlreadyDecided | Self::ReportAlreadyReviewed
            | Self::DuplicateReport | Self::AlreadyBlocked | Self::BoostAlreadyActive => {
                StatusCode::CONFLICT
            }
            Self::MediaUploadFailed | Self::GiftNotActive => StatusCode::BAD_REQUEST,
            Self::InsufficientCoins | Self::AvatarMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
