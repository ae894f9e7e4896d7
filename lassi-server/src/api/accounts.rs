//! Sign-up, sign-in and profile endpoints.
//!
//! # Endpoints
//!
//! - `POST /users/signup`  – create an account
//! - `POST /users/signin`  – exchange credentials for a session token
//! - `GET  /users/profile` – the signed-in user's profile
//! - `PUT  /users/profile` – update profile fields

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kanau::processor::Processor;
use lassi_core::auth::{PasswordError, hash_password, verify_password};
use lassi_core::entities::users::{GetUserByEmail, InsertUser, UpdateUserProfile, normalize_email};
use lassi_sdk::objects::{
    MessageResponse, ProfileResponse, SignInRequest, SignInResponse, SignUpRequest,
    UpdateProfileRequest,
};

use super::extractors::{AuthUser, JsonBody};
use super::{error_response, internal_error};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hash(#[from] PasswordError),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AccountsError {
    fn into_response(self) -> Response {
        match self {
            AccountsError::Validation(message) => error_response(StatusCode::BAD_REQUEST, message),
            AccountsError::EmailTaken => {
                error_response(StatusCode::BAD_REQUEST, "Email already exists")
            }
            AccountsError::InvalidCredentials => {
                error_response(StatusCode::BAD_REQUEST, "Invalid email or password")
            }
            AccountsError::NotFound => error_response(StatusCode::NOT_FOUND, "User not found"),
            AccountsError::Hash(e) => internal_error("Password hashing failed", &e),
            AccountsError::Task(e) => internal_error("Password task failed", &e),
            AccountsError::Database(e) => internal_error("Account query failed", &e),
        }
    }
}

async fn sign_up(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignUpRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AccountsError> {
    let name = body.name.trim();
    let email = normalize_email(&body.email);
    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(AccountsError::Validation(
            "Name, email and password are required",
        ));
    }
    if !email.contains('@') {
        return Err(AccountsError::Validation("Invalid email address"));
    }

    let processor = state.processor();
    if processor
        .process(GetUserByEmail {
            email: email.clone(),
        })
        .await?
        .is_some()
    {
        return Err(AccountsError::EmailTaken);
    }

    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let user = processor
        .process(InsertUser {
            name: name.to_owned(),
            email,
            password_hash,
            mobile: body.mobile.trim().to_owned(),
        })
        .await?
        .ok_or(AccountsError::EmailTaken)?;
    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

async fn sign_in(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignInRequest>,
) -> Result<Json<SignInResponse>, AccountsError> {
    let user = state
        .processor()
        .process(GetUserByEmail {
            email: normalize_email(&body.email),
        })
        .await?
        .ok_or(AccountsError::InvalidCredentials)?;

    let password = body.password;
    let password_hash = user.password_hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?;
    if !matches {
        return Err(AccountsError::InvalidCredentials);
    }

    let token = state.config.auth.read().await.session.issue(user.id);
    tracing::debug!(user_id = %user.id, "User signed in");

    Ok(Json(SignInResponse {
        message: "Sign-in successful".to_string(),
        token,
        user: user.summary(),
    }))
}

async fn get_profile(AuthUser(user): AuthUser) -> Json<ProfileResponse> {
    Json(user.profile())
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AccountsError> {
    let name = match body.name.as_deref().map(str::trim) {
        Some("") => return Err(AccountsError::Validation("Name cannot be empty")),
        other => other.map(str::to_owned),
    };

    let updated = state
        .processor()
        .process(UpdateUserProfile {
            id: user.id,
            name,
            mobile: body.mobile.map(|mobile| mobile.trim().to_owned()),
            dob: body.dob,
            address: body.address,
        })
        .await?
        .ok_or(AccountsError::NotFound)?;

    Ok(Json(updated.profile()))
}
