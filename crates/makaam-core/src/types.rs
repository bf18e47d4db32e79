use crate::error::MakaamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MakaamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(MakaamError::Validation(format!("unknown role '{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Skill level, used both for a learner's experience and a resource's difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = MakaamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(MakaamError::Validation(format!("unknown level '{s}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Course,
    Article,
    Video,
    Book,
    Tool,
    #[default]
    Other,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Course => "course",
            ResourceKind::Article => "article",
            ResourceKind::Video => "video",
            ResourceKind::Book => "book",
            ResourceKind::Tool => "tool",
            ResourceKind::Other => "other",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = MakaamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "course" => Ok(ResourceKind::Course),
            "article" => Ok(ResourceKind::Article),
            "video" => Ok(ResourceKind::Video),
            "book" => Ok(ResourceKind::Book),
            "tool" => Ok(ResourceKind::Tool),
            "other" => Ok(ResourceKind::Other),
            _ => Err(MakaamError::Validation(format!(
                "unknown resource kind '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// CurrentStatus
// ---------------------------------------------------------------------------

/// Where the learner is today, captured during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentStatus {
    Student,
    Graduate,
    WorkingProfessional,
    CareerSwitcher,
}

impl CurrentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CurrentStatus::Student => "student",
            CurrentStatus::Graduate => "graduate",
            CurrentStatus::WorkingProfessional => "working_professional",
            CurrentStatus::CareerSwitcher => "career_switcher",
        }
    }

    /// Human phrasing for prompts.
    pub fn describe(self) -> &'static str {
        match self {
            CurrentStatus::Student => "a student",
            CurrentStatus::Graduate => "a recent graduate",
            CurrentStatus::WorkingProfessional => "a working professional",
            CurrentStatus::CareerSwitcher => "switching careers",
        }
    }
}

impl fmt::Display for CurrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RoadmapSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapSource {
    Llm,
    Fallback,
}

impl RoadmapSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RoadmapSource::Llm => "llm",
            RoadmapSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RoadmapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
