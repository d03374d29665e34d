use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::paste::{PasteListResponse, PasteSummary};
use crate::models::user::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, ValidateResponse,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::hash;

/// Handle user registration.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    operation_id = "register",
    summary = "Register a new account",
    description = "Creates an account from a username (`u`), email (`m`) and password (`p`). Username and email must both be unused.",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid body, or username/email already in use (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    validate_register_request(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        password_hash: Set(hash),
        is_admin: Set(false),
        is_banned: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration rejected: username or email taken");
            AppError::Validation("Username or email is already in use".into())
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(RegisterResponse { id: user.id }))
}

/// Handle user login.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "login",
    summary = "Log in",
    description = "Exchanges a username or email (`u`) and password (`p`) for a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Invalid body or missing password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unknown user or wrong password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account is banned (PERMISSION_DENIED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(login = %payload.login))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let login = payload.login.trim();

    let user = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(login))
                .add(user::Column::Email.eq(login)),
        )
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login for unknown user");
            AppError::InvalidCredentials
        })?;

    let is_valid = hash::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        tracing::info!("Invalid credentials");
        return Err(AppError::InvalidCredentials);
    }

    if user.is_banned {
        return Err(AppError::PermissionDenied);
    }

    let token = state
        .jwt
        .issue(user.id, &user.email)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse { token }))
}

/// Return the identity carried by the caller's token.
#[utoipa::path(
    get,
    path = "/validate",
    tag = "Users",
    operation_id = "validateToken",
    summary = "Validate a token",
    responses(
        (status = 200, description = "Token is valid", body = ValidateResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn validate(auth_user: AuthUser) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        user_id: auth_user.user_id,
        email: auth_user.email,
    })
}

/// List the caller's own pastes.
#[utoipa::path(
    get,
    path = "/pastes",
    tag = "Users",
    operation_id = "listOwnPastes",
    summary = "List my pastes",
    description = "Returns metadata for every paste the caller owns, newest first. Content is omitted.",
    responses(
        (status = 200, description = "Caller's pastes", body = PasteListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Listing failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_pastes(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<PasteListResponse>, AppError> {
    let rows = state.pastes.list_by_author(auth_user.user_id).await?;
    Ok(Json(PasteListResponse {
        pastes: rows.into_iter().map(PasteSummary::from).collect(),
    }))
}
