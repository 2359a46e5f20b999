//! Accounts, sessions and the bearer-token middleware
//!
//! Protected routes expect `Authorization: Bearer <token>`. The middleware
//! resolves the token to a user and inserts [`CurrentUser`] into the request
//! extensions for handlers to extract.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use echoic_common::auth::verify_password;

use crate::db::{sessions, users, User};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authenticated caller, available to protected handlers
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Trimmed, non-empty text field
fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Non-empty secret; passwords are taken as typed
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(username), Some(email), Some(password), Some(confirm_password)) = (
        required(request.username),
        required(request.email),
        non_empty(request.password),
        non_empty(request.confirm_password),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    };

    if password != confirm_password {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if users::username_exists(&state.db, &username).await? {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    if users::email_exists(&state.db, &email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let user = users::create_user(&state.db, &username, &email, &password).await?;
    info!(user = %user.guid, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(username), Some(password)) = (required(request.username), non_empty(request.password)) else {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    };

    let user = users::find_by_username(&state.db, &username)
        .await?
        .filter(|user| verify_password(&password, &user.password_hash))
        .ok_or_else(|| {
            warn!(username = %username, "Failed login attempt");
            ApiError::Unauthorized("Invalid username or password".to_string())
        })?;

    let token = sessions::create_session(&state.db, &user.guid).await?;
    info!(user = %user.guid, "User logged in");

    Ok(Json(json!({ "token": token, "user": user })))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<serde_json::Value>> {
    sessions::delete_session(&state.db, &current.token).await?;
    info!(user = %current.user.guid, "User logged out");

    Ok(Json(json!({ "success": true })))
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
///
/// Applied to protected routes only; `/health`, register and login are
/// public.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?
        .to_string();

    let user = sessions::find_user_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    request
        .extensions_mut()
        .insert(CurrentUser { user, token });

    Ok(next.run(request).await)
}
