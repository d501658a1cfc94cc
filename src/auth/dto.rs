use serde::{Deserialize, Serialize};

use crate::auth::services::is_valid_username;
use crate::error::AppError;
use crate::users::repo_types::NewUser;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        required("username", &self.username)?;
        required("password", &self.password)
    }
}

impl RegisterRequest {
    pub fn into_new_user(self) -> Result<NewUser, AppError> {
        required("username", &self.username)?;
        required("password", &self.password)?;
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;
        required("phone", &self.phone)?;
        if !is_valid_username(&self.username) {
            return Err(AppError::Validation("Invalid username".into()));
        }
        Ok(NewUser {
            username: self.username,
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}
