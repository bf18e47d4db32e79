use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use makaam_core::error::MakaamError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit 401 / 403 errors
// ---------------------------------------------------------------------------

/// Carries an HTTP 401 through the `anyhow::Error` chain.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UnauthorizedError(String);

/// Carries an HTTP 403 through the `anyhow::Error` chain.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ForbiddenError(String);

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. The body is always
/// `{"error": "<message>"}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// 400 Bad Request.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(MakaamError::Validation(msg.into()).into())
    }

    /// 401 Unauthorized.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    /// 403 Forbidden.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(u) = self.0.downcast_ref::<UnauthorizedError>() {
            let body = serde_json::json!({ "error": u.0.clone() });
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }
        if let Some(f) = self.0.downcast_ref::<ForbiddenError>() {
            let body = serde_json::json!({ "error": f.0.clone() });
            return (StatusCode::FORBIDDEN, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<MakaamError>() {
            match e {
                MakaamError::UserNotFound(_)
                | MakaamError::ResourceNotFound(_)
                | MakaamError::CheckinNotFound(_)
                | MakaamError::RoadmapNotFound
                | MakaamError::MilestoneNotFound(_) => StatusCode::NOT_FOUND,
                MakaamError::EmailTaken(_) | MakaamError::CheckinExists { .. } => {
                    StatusCode::CONFLICT
                }
                MakaamError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                MakaamError::Validation(_) | MakaamError::OnboardingIncomplete => {
                    StatusCode::BAD_REQUEST
                }
                MakaamError::NotInitialized
                | MakaamError::RoadmapParse(_)
                | MakaamError::Store(_)
                | MakaamError::Io(_)
                | MakaamError::Yaml(_)
                | MakaamError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
