//! Account API Endpoints
//! Mission: Expose registration, login and role management over HTTP

use crate::auth::{
    error::AccountError,
    middleware::{auth_middleware, extract_claims},
    models::{
        AccountResponse, Claims, LoginRequest, LoginResponse, NewAccount, UpdateRolesRequest,
        UpdateRolesResponse,
    },
    service::AccountService,
};
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Role required to change other accounts' roles
pub const ADMIN_ROLE: &str = "admin";

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AccountService>,
}

impl AuthState {
    pub fn new(service: Arc<AccountService>) -> Self {
        Self { service }
    }
}

/// Build the HTTP router for the account endpoints
pub fn router(state: AuthState) -> Router {
    let jwt_handler = state.service.jwt_handler().clone();

    let protected = Router::new()
        .route("/api/auth/me", get(get_current_user))
        .route("/api/users/:id/roles", put(update_roles))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware));

    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run a blocking service call (bcrypt, SQLite) off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, AuthApiError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("Account task failed to complete: {}", e);
            AuthApiError::InternalError
        })?
        .map_err(AuthApiError::from)
}

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<NewAccount>,
) -> Result<(StatusCode, Json<AccountResponse>), AuthApiError> {
    info!("📝 Registration attempt: {}", payload.email);

    let service = state.service.clone();
    let account = run_blocking(move || service.register(payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::from_account(&account)),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.email);

    let service = state.service.clone();
    let issued = run_blocking(move || service.authenticate(&payload.email, &payload.password))
        .await
        .map_err(|e| match e {
            // Do not reveal which half of the credentials was wrong
            AuthApiError::AccountNotFound => AuthApiError::InvalidCredentials,
            other => other,
        })?;

    Ok(Json(LoginResponse::from(issued)))
}

/// Get current identity - GET /api/auth/me
/// Answers from the token claims alone, no store lookup
pub async fn get_current_user(req: Request) -> Result<Json<Claims>, AuthApiError> {
    let claims = extract_claims(&req).ok_or(AuthApiError::Unauthorized)?;
    Ok(Json(claims.clone()))
}

/// Update roles - PUT /api/users/:id/roles (Admin only)
pub async fn update_roles(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Path(account_id): Path<String>,
    Json(payload): Json<UpdateRolesRequest>,
) -> Result<Json<UpdateRolesResponse>, AuthApiError> {
    if !claims.has_role(ADMIN_ROLE) {
        warn!(
            caller = %claims.sub,
            "Role update on {} refused: caller is not an admin", account_id
        );
        return Err(AuthApiError::Forbidden);
    }

    let service = state.service.clone();
    let modified = run_blocking(move || service.update_roles(&account_id, payload.roles)).await?;

    Ok(Json(UpdateRolesResponse { modified }))
}

/// Health check - GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    Validation(String),
    AccountAlreadyExists,
    AccountNotFound,
    InvalidCredentials,
    InvalidAccountId,
    RolesNotUpdated,
    Unauthorized,
    Forbidden,
    InternalError,
}

impl From<AccountError> for AuthApiError {
    fn from(err: AccountError) -> Self {
        if err.is_internal() {
            error!("Account operation failed: {}", err);
        }

        match err {
            AccountError::Validation(e) => AuthApiError::Validation(e.to_string()),
            AccountError::DuplicateAccount => AuthApiError::AccountAlreadyExists,
            AccountError::NotFound => AuthApiError::AccountNotFound,
            AccountError::InvalidCredentials => AuthApiError::InvalidCredentials,
            AccountError::MalformedIdentifier(_) => AuthApiError::InvalidAccountId,
            AccountError::NoChange => AuthApiError::RolesNotUpdated,
            AccountError::Hashing(_) | AccountError::Signing(_) | AccountError::Store(_) => {
                AuthApiError::InternalError
            }
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::Validation(details) => (StatusCode::BAD_REQUEST, details),
            AuthApiError::AccountAlreadyExists => {
                (StatusCode::CONFLICT, "Email already registered".to_string())
            }
            AuthApiError::AccountNotFound => (StatusCode::NOT_FOUND, "Account not found".to_string()),
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AuthApiError::InvalidAccountId => (
                StatusCode::BAD_REQUEST,
                "Invalid account ID format".to_string(),
            ),
            AuthApiError::RolesNotUpdated => (
                StatusCode::NOT_FOUND,
                "Account not found or roles unchanged".to_string(),
            ),
            AuthApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AuthApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Insufficient permissions".to_string(),
            ),
            AuthApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::error::StoreError;

    #[test]
    fn test_account_error_mapping() {
        assert!(matches!(
            AuthApiError::from(AccountError::DuplicateAccount),
            AuthApiError::AccountAlreadyExists
        ));
        assert!(matches!(
            AuthApiError::from(AccountError::NoChange),
            AuthApiError::RolesNotUpdated
        ));
        assert!(matches!(
            AuthApiError::from(AccountError::MalformedIdentifier("x".into())),
            AuthApiError::InvalidAccountId
        ));
        assert!(matches!(
            AuthApiError::from(AccountError::Store(StoreError::Corrupt("x".into()))),
            AuthApiError::InternalError
        ));
        assert!(matches!(
            AuthApiError::from(AccountError::Signing("no key".into())),
            AuthApiError::InternalError
        ));
    }

    #[test]
    fn test_auth_api_error_responses() {
        let invalid_creds = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid_creds.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthApiError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let not_found = AuthApiError::RolesNotUpdated.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = AuthApiError::AccountAlreadyExists.into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let bad_id = AuthApiError::InvalidAccountId.into_response();
        assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

        let internal = AuthApiError::InternalError.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
