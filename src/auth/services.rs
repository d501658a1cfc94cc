use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo_types::NewUser;

/// Username recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Check credentials, bump `last_login_at`, and issue a token.
pub async fn login(st: &AppState, username: &str, password: &str) -> Result<String, AppError> {
    if !st.users.verify_password(username, password).await? {
        warn!(%username, "login rejected");
        return Err(AppError::InvalidCredentials);
    }
    st.users.touch_login(username).await?;

    let token = JwtKeys::from_ref(st).sign(username)?;
    info!(%username, "user logged in");
    Ok(token)
}

/// Create the account, then log it in exactly as `login` would.
pub async fn register(st: &AppState, new_user: NewUser) -> Result<String, AppError> {
    let profile = st.users.register(new_user).await?;
    st.users.touch_login(&profile.username).await?;

    let token = JwtKeys::from_ref(st).sign(&profile.username)?;
    info!(username = %profile.username, "user registered");
    Ok(token)
}

pub fn authenticate(keys: &JwtKeys, token: &str) -> Result<Identity, AppError> {
    if token.is_empty() {
        return Err(AppError::InvalidToken);
    }
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "token rejected");
        AppError::InvalidToken
    })?;
    Ok(Identity {
        username: claims.username,
    })
}
