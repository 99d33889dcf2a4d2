use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::dto::{MessageDto, UpdateMessageRequest};
use crate::api::state::AppState;
use crate::db::{MessageRepository, NewMessage};
use crate::error::AppError;

/// A path id that is not a UUID cannot name a stored message.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found(raw))
}

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("message {} not found", id))
}

/// GET /messages
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    let messages = MessageRepository::find_all(&state.db).await?;

    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

/// POST /messages
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageDto>, JsonRejection>,
) -> Result<Json<MessageDto>, AppError> {
    let Json(dto) = payload?;
    let new_message = NewMessage::try_from(dto)?;

    let message = MessageRepository::insert(&state.db, new_message).await?;
    tracing::debug!(id = %message.id, client_ip = %message.client_ip, "message created");

    Ok(Json(message.into()))
}

/// GET /messages/:id
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageDto>, AppError> {
    let id = parse_id(&id)?;

    let message = MessageRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(message.into()))
}

/// DELETE /messages/:id
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;

    if !MessageRepository::delete_by_id(&state.db, id).await? {
        return Err(not_found(id));
    }
    tracing::debug!(%id, "message deleted");

    Ok(StatusCode::OK)
}

/// GET and DELETE /messages/message: `message` is not an id.
pub async fn message_path_not_found() -> AppError {
    not_found("message")
}

/// PATCH /messages/message
pub async fn update_message(
    State(state): State<AppState>,
    payload: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<MessageDto>, AppError> {
    let Json(req) = payload?;

    let message = MessageRepository::update_message(&state.db, req.message_id, &req.updated_message)
        .await?
        .ok_or_else(|| not_found(req.message_id))?;
    tracing::debug!(id = %message.id, "message updated");

    Ok(Json(message.into()))
}
