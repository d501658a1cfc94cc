use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct NewMessageRequest {
    pub to_username: String,
    pub body: String,
}

impl NewMessageRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.to_username.trim().is_empty() {
            return Err(AppError::Validation("to_username is required".into()));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::Validation("body is required".into()));
        }
        Ok(())
    }
}

/// `{"message": ...}`
#[derive(Debug, Serialize)]
pub struct MessageEnvelope<T> {
    pub message: T,
}

/// `{"messages": [...]}`
#[derive(Debug, Serialize)]
pub struct MessageList<T> {
    pub messages: Vec<T>,
}
