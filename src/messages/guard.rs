//! Who may see or act on a message. Identity checks happen earlier, in the
//! `AuthUser` extractor; everything here assumes an authenticated caller.

use tracing::warn;

use crate::auth::services::Identity;
use crate::error::AppError;
use crate::messages::repo_types::Parties;

pub fn can_access_message(identity: &Identity, message: &impl Parties) -> bool {
    identity.username == message.from_username() || identity.username == message.to_username()
}

pub fn can_send(_identity: &Identity) -> bool {
    true
}

/// Recipient only; the sender may not mark their own message read.
pub fn can_mark_read(identity: &Identity, message: &impl Parties) -> bool {
    identity.username == message.to_username()
}

pub fn can_view_mailbox(identity: &Identity, username: &str) -> bool {
    identity.username == username
}

fn deny(identity: &Identity, action: &str) -> AppError {
    warn!(username = %identity.username, action, "forbidden");
    AppError::Forbidden(format!("Not allowed to {}", action))
}

pub fn ensure_can_access(identity: &Identity, message: &impl Parties) -> Result<(), AppError> {
    if can_access_message(identity, message) {
        Ok(())
    } else {
        Err(deny(identity, "view this message"))
    }
}

pub fn ensure_can_send(identity: &Identity) -> Result<(), AppError> {
    if can_send(identity) {
        Ok(())
    } else {
        Err(deny(identity, "send messages"))
    }
}

pub fn ensure_can_mark_read(identity: &Identity, message: &impl Parties) -> Result<(), AppError> {
    if can_mark_read(identity, message) {
        Ok(())
    } else {
        Err(deny(identity, "mark this message read"))
    }
}

pub fn ensure_can_view_mailbox(identity: &Identity, username: &str) -> Result<(), AppError> {
    if can_view_mailbox(identity, username) {
        Ok(())
    } else {
        Err(deny(identity, "view another user's account"))
    }
}
