use axum::extract::{Path, State};
use axum::{Extension, Json};
use llm_chat::{ChatClient, ChatMessage};
use makaam_core::error::MakaamError;
use makaam_core::roadmap::{self, Roadmap};
use makaam_core::user::Profile;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/roadmap/generate - (re)generate the caller's roadmap.
///
/// One model attempt; any failure (transport, status, unparseable reply)
/// falls back to the built-in generator. Replaces any existing roadmap.
pub async fn generate_roadmap(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = auth.id;
    let store = app.store.clone();
    let profile = tokio::task::spawn_blocking(move || {
        let user = store.get_user(user_id)?;
        user.onboarding.ok_or(MakaamError::OnboardingIncomplete)
    })
    .await
    .map_err(AppError::join)??;

    let generated = build_roadmap(&app, &profile).await;

    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        store.modify_user(user_id, |user| {
            let response = serde_json::json!({
                "source": generated.source,
                "progress": generated.progress(),
                "roadmap": generated,
            });
            user.set_roadmap(generated);
            Ok(response)
        })
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

async fn build_roadmap(app: &AppState, profile: &Profile) -> Roadmap {
    if let Some(client) = &app.llm {
        match ask_llm(client, profile).await {
            Ok(r) => return r,
            Err(e) => tracing::warn!("llm roadmap failed, using built-in generator: {e:#}"),
        }
    }
    roadmap::fallback(profile)
}

async fn ask_llm(client: &ChatClient, profile: &Profile) -> anyhow::Result<Roadmap> {
    let prompt = roadmap::build_prompt(profile);
    let reply = client
        .complete(&[
            ChatMessage::system(prompt.system),
            ChatMessage::user(prompt.user),
        ])
        .await?;
    let parsed = roadmap::parse_response(&reply.content, profile)?;
    tracing::info!(
        model = %reply.model,
        phases = parsed.phases.len(),
        "generated roadmap with llm"
    );
    Ok(parsed)
}

/// GET /api/roadmap. The caller's roadmap with progress.
pub async fn get_roadmap(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let user = store.get_user(auth.id)?;
        let roadmap = user.roadmap.ok_or(MakaamError::RoadmapNotFound)?;
        Ok::<_, MakaamError>(serde_json::json!({
            "progress": roadmap.progress(),
            "next_milestone": roadmap.next_milestone(),
            "roadmap": roadmap,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct MilestoneBody {
    pub completed: bool,
}

/// PATCH /api/roadmap/milestones/:id. Mark a milestone done or not done.
pub async fn update_milestone(
    State(app): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<MilestoneBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        store.modify_user(auth.id, |user| {
            let roadmap = user.roadmap_mut()?;
            let milestone = roadmap.set_milestone(&id, body.completed)?.clone();
            Ok(serde_json::json!({
                "milestone": milestone,
                "progress": roadmap.progress(),
            }))
        })
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
