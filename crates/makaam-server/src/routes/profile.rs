use axum::extract::State;
use axum::{Extension, Json};
use makaam_core::user::Profile;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/profile. Onboarding answers, if any.
pub async fn get_profile(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || store.get_user(auth.id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({
        "onboarding_completed": user.onboarding_completed(),
        "profile": user.onboarding,
    })))
}

/// PUT /api/profile. Complete or redo onboarding.
pub async fn put_profile(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(profile): Json<Profile>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        store.modify_user(auth.id, |user| {
            user.complete_onboarding(profile)?;
            Ok(serde_json::json!({
                "user": user.view(),
                "profile": user.onboarding,
            }))
        })
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
