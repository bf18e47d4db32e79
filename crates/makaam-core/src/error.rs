use thiserror::Error;

#[derive(Debug, Error)]
pub enum MakaamError {
    #[error("not initialized: run 'makaam init'")]
    NotInitialized,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("check-in not found: {0}")]
    CheckinNotFound(String),

    #[error("a check-in already exists for the week of {week}")]
    CheckinExists { week: String },

    #[error("no roadmap generated yet")]
    RoadmapNotFound,

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("onboarding must be completed first")]
    OnboardingIncomplete,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("could not parse roadmap: {0}")]
    RoadmapParse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MakaamError>;
