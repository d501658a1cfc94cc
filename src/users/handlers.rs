use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    messages::{
        guard,
        repo_types::{ReceivedMessage, SentMessage},
        MessageList,
    },
    state::AppState,
    users::repo_types::{UserProfile, UserSummary},
};

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserProfile,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:username", get(get_user))
        .route("/users/:username/to", get(messages_to))
        .route("/users/:username/from", get(messages_from))
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<UserList>, AppError> {
    let users = state.users.list_all().await?;
    Ok(Json(UserList { users }))
}

#[instrument(skip(state, user))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserEnvelope>, AppError> {
    guard::ensure_can_view_mailbox(&user, &username)?;
    let profile = state.users.get_profile(&username).await?;
    Ok(Json(UserEnvelope { user: profile }))
}

/// Messages received by `username`.
#[instrument(skip(state, user))]
pub async fn messages_to(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<MessageList<ReceivedMessage>>, AppError> {
    guard::ensure_can_view_mailbox(&user, &username)?;
    let messages = state.messages.list_received_by(&username).await?;
    Ok(Json(MessageList { messages }))
}

/// Messages sent by `username`.
#[instrument(skip(state, user))]
pub async fn messages_from(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<MessageList<SentMessage>>, AppError> {
    guard::ensure_can_view_mailbox(&user, &username)?;
    let messages = state.messages.list_sent_by(&username).await?;
    Ok(Json(MessageList { messages }))
}
