use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use makaam_core::error::MakaamError;
use makaam_core::resource::{self, ResourceFilter};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/resources. Browse the catalog.
///
/// Query: `q`, `category`, `kind`, `level`, `free`, `tag`.
pub async fn list_resources(
    State(app): State<AppState>,
    Query(filter): Query<ResourceFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let all = tokio::task::spawn_blocking(move || store.list_resources())
        .await
        .map_err(AppError::join)??;
    let list = resource::filter_resources(all, &filter);
    Ok(Json(serde_json::json!(list)))
}

/// GET /api/resources/:id
pub async fn get_resource(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let r = tokio::task::spawn_blocking(move || store.get_resource(id))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!(r)))
}

/// GET /api/resources/saved. The caller's bookmarked resources.
pub async fn saved_resources(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let list = tokio::task::spawn_blocking(move || {
        let user = store.get_user(auth.id)?;
        let mut out = Vec::with_capacity(user.saved_resources.len());
        for id in &user.saved_resources {
            match store.get_resource(*id) {
                Ok(r) => out.push(r),
                Err(MakaamError::ResourceNotFound(_)) => {
                    tracing::debug!(resource = %id, "saved resource no longer exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok::<_, MakaamError>(out)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(serde_json::json!(list)))
}

/// POST /api/resources/:id/save. Bookmark a resource. Idempotent.
pub async fn save_resource(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || {
        store.get_resource(id)?;
        store.modify_user(auth.id, |user| Ok(user.save_resource(id)))
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "resource_id": id, "saved": true })))
}

/// DELETE /api/resources/:id/save. Remove a bookmark. Idempotent.
pub async fn unsave_resource(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || {
        store.modify_user(auth.id, |user| Ok(user.unsave_resource(id)))
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "resource_id": id, "saved": false })))
}
