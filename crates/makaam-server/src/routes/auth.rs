use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use makaam_core::error::MakaamError;
use makaam_core::types::Role;
use makaam_core::user::{self, User};

use crate::auth::{self as jwt, AuthUser};
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register. Create an account and return a token.
pub async fn register(
    State(app): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    user::validate_registration(&body.name, &body.email, &body.password)?;

    let store = app.store.clone();
    let config = app.config.clone();
    let created = tokio::task::spawn_blocking(move || {
        let role = if config.auth.is_admin_email(&body.email) {
            Role::Admin
        } else {
            Role::User
        };
        let hash = jwt::hash_password(&body.password, config.auth.bcrypt_cost)?;
        let user = User::new(body.name, &body.email, hash, role);
        store.create_user(&user)?;
        Ok::<_, anyhow::Error>(user)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(user = %created.email, role = %created.role, "registered");
    let token = app.jwt.issue(&created)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "token": token,
            "user": created.view(),
        })),
    ))
}

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login. Exchange credentials for a token.
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || {
        let user = store
            .find_user_by_email(&body.email)?
            .ok_or(MakaamError::InvalidCredentials)?;
        if !jwt::verify_password(&body.password, &user.password_hash) {
            return Err(MakaamError::InvalidCredentials);
        }
        Ok::<_, MakaamError>(user)
    })
    .await
    .map_err(AppError::join)??;

    let token = app.jwt.issue(&user)?;
    Ok(Json(serde_json::json!({
        "token": token,
        "user": user.view(),
    })))
}

/// GET /api/auth/me. The caller's account.
pub async fn me(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || store.get_user(auth.id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "user": user.view() })))
}
