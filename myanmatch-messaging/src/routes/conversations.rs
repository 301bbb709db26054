use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::models::{Conversation, Message};
use crate::schema::{conversations, messages};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationPreview {
    pub id: Uuid,
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// GET /conversations - the caller's conversations, newest activity first
pub async fn list_conversations(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationPreview>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    let convs: Vec<Conversation> = conversations::table
        .filter(conversations::user_a.eq(user.id).or(conversations::user_b.eq(user.id)))
        .order(conversations::last_message_at.desc().nulls_last())
        .load::<Conversation>(&mut conn)?;

    let mut previews = Vec::with_capacity(convs.len());
    for conv in convs {
        let last_msg: Option<Message> = messages::table
            .filter(messages::conversation_id.eq(conv.id))
            .order(messages::created_at.desc())
            .first::<Message>(&mut conn)
            .optional()?;

        let partner_id = if conv.user_a == user.id { conv.user_b } else { conv.user_a };

        previews.push(ConversationPreview {
            id: conv.id,
            match_id: conv.match_id,
            partner_id,
            last_message: last_msg.as_ref().and_then(|m| m.content.clone()),
            last_message_at: conv.last_message_at,
            created_at: conv.created_at,
        });
    }

    Ok(Json(ApiResponse::ok(previews)))
}

/// GET /conversations/:id
pub async fn get_conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    let conv = conversations::table
        .find(conversation_id)
        .first::<Conversation>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    if !conv.has_member(user.id) {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }

    Ok(Json(ApiResponse::ok(conv)))
}
