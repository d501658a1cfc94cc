use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    messages::{
        dto::{MessageEnvelope, NewMessageRequest},
        guard,
        repo_types::{MessageDetail, MessageRecord, ReadReceipt},
    },
    state::AppState,
};

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(create_message))
        .route("/messages/:id", get(get_message))
        .route("/messages/:id/read", post(mark_read))
}

/// GET /messages/:id: sender or recipient only.
#[instrument(skip(state, user, id))]
pub async fn get_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageEnvelope<MessageDetail>>, AppError> {
    let Path(id) = id?;
    let message = state.messages.get(id).await?;
    guard::ensure_can_access(&user, &message)?;
    Ok(Json(MessageEnvelope { message }))
}

/// POST /messages: any logged-in user may message any other.
#[instrument(skip(state, user, payload))]
pub async fn create_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<NewMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageEnvelope<MessageRecord>>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    guard::ensure_can_send(&user)?;

    let message = state
        .messages
        .create(&user.username, payload.to_username.trim(), &payload.body)
        .await?;
    info!(id = message.id, from = %message.from_username, to = %message.to_username, "message sent");
    Ok((StatusCode::CREATED, Json(MessageEnvelope { message })))
}

/// POST /messages/:id/read: recipient only.
#[instrument(skip(state, user, id))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageEnvelope<ReadReceipt>>, AppError> {
    let Path(id) = id?;
    let message = state.messages.get(id).await?;
    guard::ensure_can_mark_read(&user, &message)?;

    let receipt = state.messages.mark_read(id).await?;
    info!(id, username = %user.username, "message read");
    Ok(Json(MessageEnvelope { message: receipt }))
}
