mod dto;
pub mod guard;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use dto::MessageList;

pub fn router() -> Router<AppState> {
    handlers::message_routes()
}
