//! Registration and login handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::error::ApiError;
use crate::server::SharedState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User fields safe to return to clients
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: u64,
    pub email: String,
    pub name: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::Validation(
            "Email and password required".to_string(),
        )),
    }
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<SharedState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = required_credentials(request.email, request.password)?;

    let digest = state.passwords.hash(&password);
    let user = state.users.create(&email, &digest, request.name).await?;
    let token = state.tokens.issue(user.id).await;

    tracing::info!(user_id = user.id, "registered new user");

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// `POST /auth/login`
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = required_credentials(request.email, request.password)?;

    let user = state
        .users
        .find_by_email(&email)
        .await
        .ok_or(ApiError::Unauthorized)?;

    if !state.passwords.verify(&password, &user.password_digest) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.tokens.issue(user.id).await;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}
