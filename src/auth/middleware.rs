//! Request authentication middleware
//!
//! `require_auth` guards every `/api` route except the public ones,
//! validating the session token (bearer header or `token` cookie) and
//! attaching the resolved account to the request. `require_admin` is
//! layered onto admin sub-routers on top of it.

use crate::core::state::ServerState;
use crate::db::models::user::Role;
use crate::db::repository::UserRepository;
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

/// The authenticated account attached to a request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User reference, as `user:key`
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Routes reachable without a session
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/api/health" {
        return true;
    }
    if matches!(path, "/api/auth/register" | "/api/auth/login") {
        return true;
    }
    // The catalog is world-readable; writes stay behind auth
    if *method == Method::GET
        && (path == "/api/products"
            || path.starts_with("/api/products/")
            || path == "/api/categories"
            || path.starts_with("/api/categories/"))
    {
        return true;
    }
    false
}

/// Pull the session token from the Authorization header or the `token`
/// cookie
fn extract_token(request: &Request) -> Option<String> {
    if let Some(header) = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        && let Some(token) = crate::auth::jwt::JwtService::extract_from_header(header)
    {
        return Some(token.to_string());
    }

    let cookies = request
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some("token") {
            return parts.next().map(|v| v.to_string());
        }
    }
    None
}

/// Authentication middleware for the API surface
pub async fn require_auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // CORS preflight and anything outside the API pass through
    if method == Method::OPTIONS || !path.starts_with("/api") || is_public(&method, &path) {
        return Ok(next.run(request).await);
    }

    let token = extract_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = state.jwt_service.validate_token(&token).map_err(|e| match e {
        crate::auth::jwt::JwtError::ExpiredToken => AppError::TokenExpired,
        other => AppError::invalid_token(other.to_string()),
    })?;

    // The token only proves identity at issue time; role and active
    // status are re-read from the store on every request.
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.is_active {
        return Err(AppError::AccountDeactivated);
    }

    let current = CurrentUser {
        id: user.id.as_ref().map(|id| id.to_string()).unwrap_or(claims.sub),
        name: user.name,
        email: user.email,
        role: user.role,
    };
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Admin gate, layered inside `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    if !current.is_admin() {
        return Err(AppError::forbidden("admin access required"));
    }
    Ok(next.run(request).await)
}
