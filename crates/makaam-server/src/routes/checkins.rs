use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use makaam_core::checkin::{self, NewCheckin};
use makaam_core::error::MakaamError;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/checkins. The caller's check-ins, newest first.
pub async fn list_checkins(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let list = tokio::task::spawn_blocking(move || store.list_checkins(auth.id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!(list)))
}

/// POST /api/checkins. Record this week's check-in.
///
/// Milestones listed in `completed_milestones` are marked done on the
/// roadmap in the same write.
pub async fn create_checkin(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<NewCheckin>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let entry = body.into_checkin(auth.id, Utc::now().date_naive())?;
        let owner = store.insert_checkin_with_owner(&entry, |user| {
            if !entry.completed_milestones.is_empty() {
                user.roadmap_mut()?
                    .complete_milestones(&entry.completed_milestones)?;
            }
            Ok(())
        })?;
        let progress = owner.roadmap.as_ref().map(|r| r.progress());

        Ok::<_, MakaamError>(serde_json::json!({
            "checkin": entry,
            "progress": progress,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/checkins/summary. Totals and the current weekly streak.
pub async fn checkin_summary(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let list = tokio::task::spawn_blocking(move || store.list_checkins(auth.id))
        .await
        .map_err(AppError::join)??;
    let summary = checkin::summarize(&list, Utc::now().date_naive());
    Ok(Json(serde_json::json!(summary)))
}

/// DELETE /api/checkins/:id. Remove one of the caller's check-ins.
pub async fn delete_checkin(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || store.delete_checkin(auth.id, id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
