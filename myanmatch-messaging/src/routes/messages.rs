use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::clients::storage::{audio_ext, buckets, image_ext};
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::pagination::{Paginated, PaginationParams};
use myanmatch_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{message_kind, Conversation, Message, NewMessage};
use crate::schema::{conversations, messages};
use crate::AppState;

fn member_conversation(
    conn: &mut diesel::PgConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> AppResult<Conversation> {
    let conv = conversations::table
        .find(conversation_id)
        .first::<Conversation>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    if !conv.has_member(user_id) {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }

    Ok(conv)
}

/// GET /conversations/:id/messages - paginated, newest first
pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;

    member_conversation(&mut conn, conversation_id, user.id)?;

    let total: i64 = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .count()
        .get_result(&mut conn)?;

    let items: Vec<Message> = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .order(messages::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Message>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// POST /conversations/:id/messages - text message
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    if req.content.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message content is empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;
    member_conversation(&mut conn, conversation_id, user.id)?;

    let message = insert_message(
        &mut conn,
        NewMessage {
            conversation_id,
            sender_id: user.id,
            kind: message_kind::TEXT.to_string(),
            content: Some(req.content.trim().to_string()),
            attachment_url: None,
        },
    )?;

    publisher::publish_message_sent(&state.rabbitmq, &message).await;

    Ok(Json(ApiResponse::ok(message)))
}

/// POST /conversations/:id/attachments - file or voice message (multipart)
pub async fn send_attachment(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Message>>> {
    let mut conn = state.db.get().map_err(|e| AppError::Internal(e.into()))?;
    member_conversation(&mut conn, conversation_id, user.id)?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::ValidationError, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::AttachmentMissing, "no attachment provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::ValidationError, format!("failed to read attachment: {e}")))?;

    // Voice notes land in the voice bucket, anything else in chat-files
    let (kind, bucket, ext) = if let Some(ext) = audio_ext(&content_type) {
        (message_kind::VOICE, buckets::CHAT_VOICE, ext)
    } else if let Some(ext) = image_ext(&content_type) {
        (message_kind::FILE, buckets::CHAT_FILES, ext)
    } else {
        (message_kind::FILE, buckets::CHAT_FILES, "bin")
    };

    let key = format!("{}/{}.{}", conversation_id, Uuid::now_v7(), ext);
    let attachment_url = state
        .storage
        .upload(bucket, &key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::internal(format!("attachment upload failed: {e}")))?;

    let message = insert_message(
        &mut conn,
        NewMessage {
            conversation_id,
            sender_id: user.id,
            kind: kind.to_string(),
            content: None,
            attachment_url: Some(attachment_url),
        },
    )?;

    publisher::publish_message_sent(&state.rabbitmq, &message).await;

    Ok(Json(ApiResponse::ok(message)))
}

fn insert_message(conn: &mut diesel::PgConnection, new_message: NewMessage) -> AppResult<Message> {
    let message = conn.transaction::<Message, diesel::result::Error, _>(|conn| {
        let message = diesel::insert_into(messages::table)
            .values(&new_message)
            .get_result::<Message>(conn)?;

        diesel::update(conversations::table.find(message.conversation_id))
            .set(conversations::last_message_at.eq(Utc::now()))
            .execute(conn)?;

        Ok(message)
    })?;

    Ok(message)
}
