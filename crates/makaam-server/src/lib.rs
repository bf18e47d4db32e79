pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::path::PathBuf;

use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use makaam_core::config::Config;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.server.cors_origins);

    let public = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/resources", get(routes::resources::list_resources))
        .route("/api/resources/{id}", get(routes::resources::get_resource));

    let protected = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        // Onboarding profile
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::put_profile),
        )
        // Roadmap
        .route("/api/roadmap", get(routes::roadmap::get_roadmap))
        .route(
            "/api/roadmap/generate",
            post(routes::roadmap::generate_roadmap),
        )
        .route(
            "/api/roadmap/milestones/{id}",
            patch(routes::roadmap::update_milestone),
        )
        // Check-ins
        .route(
            "/api/checkins",
            get(routes::checkins::list_checkins).post(routes::checkins::create_checkin),
        )
        .route(
            "/api/checkins/summary",
            get(routes::checkins::checkin_summary),
        )
        .route(
            "/api/checkins/{id}",
            axum::routing::delete(routes::checkins::delete_checkin),
        )
        // Saved resources
        .route(
            "/api/resources/saved",
            get(routes::resources::saved_resources),
        )
        .route(
            "/api/resources/{id}/save",
            post(routes::resources::save_resource).delete(routes::resources::unsave_resource),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    let admin = Router::new()
        .route("/api/admin/resources", post(routes::admin::create_resource))
        .route(
            "/api/admin/resources/{id}",
            put(routes::admin::update_resource).delete(routes::admin::delete_resource),
        )
        .route("/api/admin/users", get(routes::admin::list_users))
        .route("/api/admin/stats", get(routes::admin::stats))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("ignoring invalid CORS origin '{o}': {e}");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(list))
}

/// Start the API server on the configured host and port.
pub async fn serve(root: PathBuf, config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, config, listener).await
}

/// Start the API server on a pre-bound listener.
///
/// Lets the caller read the actual port first when binding to port 0.
pub async fn serve_on(
    root: PathBuf,
    config: Config,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let app = build_router(AppState::new(root, config)?);
    let addr = listener.local_addr()?;
    tracing::info!("makaam API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
