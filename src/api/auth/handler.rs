//! Account and session handlers

use crate::auth::middleware::CurrentUser;
use crate::core::state::ServerState;
use crate::db::models::user::{ProfileUpdate, Role, User, UserCreate, UserInfo};
use crate::db::repository::UserRepository;
use crate::utils::error::{AppError, AppResult};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordUpdate {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    success: bool,
    token: String,
    user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    success: bool,
    user: UserInfo,
}

/// Issue the session token as both a response field and an HttpOnly
/// cookie
fn session_response(
    state: &ServerState,
    status: StatusCode,
    user: &User,
) -> AppResult<Response> {
    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&user_id, &user.name, &user.email, user.role.as_str())
        .map_err(|e| AppError::internal(e.to_string()))?;

    let max_age = state.jwt_service.config.expiration_minutes * 60;
    let mut cookie = format!(
        "token={}; HttpOnly; Path=/; SameSite=Strict; Max-Age={}",
        token, max_age
    );
    if state.config.is_production() {
        cookie.push_str("; Secure");
    }

    let mut response = (
        status,
        Json(SessionResponse {
            success: true,
            token,
            user: UserInfo::from(user),
        }),
    )
        .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::internal(e.to_string()))?,
    );
    Ok(response)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(mut payload): Json<UserCreate>,
) -> AppResult<Response> {
    payload.validate()?;
    // Public registration always creates a customer account
    payload.role = Some(Role::Customer);

    let users = UserRepository::new(state.db.clone());
    let user = users.create(payload).await?;

    tracing::info!(email = %user.email, "account registered");
    session_response(&state, StatusCode::CREATED, &user)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    payload.validate()?;

    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(e.to_string()))?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        return Err(AppError::AccountDeactivated);
    }

    session_response(&state, StatusCode::OK, &user)
}

/// POST /api/auth/logout
pub async fn logout() -> Response {
    let mut response = Json(serde_json::json!({
        "success": true,
        "message": "Logged out",
    }))
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("token=; HttpOnly; Path=/; Max-Age=0"),
    );
    response
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserResponse {
        success: true,
        user: UserInfo::from(&user),
    }))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let users = UserRepository::new(state.db.clone());
    let user = users.update_profile(&current.id, payload).await?;
    Ok(Json(UserResponse {
        success: true,
        user: UserInfo::from(&user),
    }))
}

/// PUT /api/auth/password
pub async fn update_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<PasswordUpdate>,
) -> AppResult<Response> {
    payload.validate()?;

    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = user
        .verify_password(&payload.current_password)
        .map_err(|e| AppError::internal(e.to_string()))?;
    if !valid {
        return Err(AppError::validation("Current password is incorrect"));
    }

    let hash = User::hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(e.to_string()))?;
    users.set_password_hash(&current.id, hash).await?;

    // Re-issue the session so old tokens do not need to be trusted
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    session_response(&state, StatusCode::OK, &user)
}
