use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use makaam_core::resource::{NewResource, ResourcePatch};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/admin/resources. Add a catalog entry.
pub async fn create_resource(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<NewResource>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let store = app.store.clone();
    let created = tokio::task::spawn_blocking(move || {
        let r = body.into_resource(Some(auth.id))?;
        store.insert_resource(&r)?;
        Ok::<_, makaam_core::MakaamError>(r)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(resource = %created.id, title = %created.title, "resource created");
    Ok((StatusCode::CREATED, Json(serde_json::json!(created))))
}

/// PUT /api/admin/resources/:id. Partial update; absent fields are kept.
pub async fn update_resource(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ResourcePatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let updated = tokio::task::spawn_blocking(move || {
        let mut r = store.get_resource(id)?;
        patch.apply(&mut r)?;
        store.update_resource(&r)?;
        Ok::<_, makaam_core::MakaamError>(r)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(serde_json::json!(updated)))
}

/// DELETE /api/admin/resources/:id. Also drops it from saved lists.
pub async fn delete_resource(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || store.delete_resource(id))
        .await
        .map_err(AppError::join)??;
    tracing::info!(resource = %id, "resource deleted");
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// GET /api/admin/users. Every account, oldest first.
pub async fn list_users(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let users = tokio::task::spawn_blocking(move || store.list_users())
        .await
        .map_err(AppError::join)??;

    let list: Vec<serde_json::Value> = users
        .iter()
        .map(|u| {
            serde_json::json!({
                "user": u.view(),
                "target_role": u.onboarding.as_ref().map(|p| p.target_role.clone()),
                "progress": u.roadmap.as_ref().map(|r| r.progress()),
                "saved_resources": u.saved_resources.len(),
            })
        })
        .collect();
    Ok(Json(serde_json::json!(list)))
}

/// GET /api/admin/stats. Document counts.
pub async fn stats(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let stats = tokio::task::spawn_blocking(move || store.stats())
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!(stats)))
}
