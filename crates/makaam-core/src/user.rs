//! Accounts and onboarding profiles.

use crate::error::{MakaamError, Result};
use crate::roadmap::Roadmap;
use crate::types::{CurrentStatus, Level, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Answers collected by the onboarding flow. Drives roadmap generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub current_status: CurrentStatus,
    #[serde(default)]
    pub education: String,
    pub field_of_interest: String,
    pub target_role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Level,
    pub weekly_hours: u32,
    pub timeline_months: u32,
    #[serde(default)]
    pub goals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<String>,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if self.field_of_interest.trim().is_empty() {
            return Err(MakaamError::Validation(
                "field_of_interest is required".into(),
            ));
        }
        if self.target_role.trim().is_empty() {
            return Err(MakaamError::Validation("target_role is required".into()));
        }
        if !(1..=80).contains(&self.weekly_hours) {
            return Err(MakaamError::Validation(
                "weekly_hours must be between 1 and 80".into(),
            ));
        }
        if !(1..=36).contains(&self.timeline_months) {
            return Err(MakaamError::Validation(
                "timeline_months must be between 1 and 36".into(),
            ));
        }
        Ok(())
    }

    /// Trim strings and drop empty or duplicate skills.
    pub fn normalized(mut self) -> Self {
        self.education = self.education.trim().to_string();
        self.field_of_interest = self.field_of_interest.trim().to_string();
        self.target_role = self.target_role.trim().to_string();
        self.goals = self.goals.trim().to_string();
        let mut skills: Vec<String> = Vec::new();
        for s in self.skills {
            let s = s.trim().to_string();
            if !s.is_empty() && !skills.iter().any(|k| k.eq_ignore_ascii_case(&s)) {
                skills.push(s);
            }
        }
        self.skills = skills;
        self.learning_style = self
            .learning_style
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Roadmap>,
    #[serde(default)]
    pub saved_resources: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            onboarding: None,
            roadmap: None,
            saved_resources: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn onboarding_completed(&self) -> bool {
        self.onboarding.is_some()
    }

    /// Store the onboarding answers. A changed profile keeps the existing
    /// roadmap; regeneration is an explicit request.
    pub fn complete_onboarding(&mut self, profile: Profile) -> Result<()> {
        let profile = profile.normalized();
        profile.validate()?;
        self.onboarding = Some(profile);
        self.touch();
        Ok(())
    }

    pub fn set_roadmap(&mut self, roadmap: Roadmap) {
        self.roadmap = Some(roadmap);
        self.touch();
    }

    pub fn roadmap_mut(&mut self) -> Result<&mut Roadmap> {
        self.roadmap.as_mut().ok_or(MakaamError::RoadmapNotFound)
    }

    /// Returns true if the resource was newly saved.
    pub fn save_resource(&mut self, id: Uuid) -> bool {
        if self.saved_resources.contains(&id) {
            return false;
        }
        self.saved_resources.push(id);
        self.touch();
        true
    }

    /// Returns true if the resource was present.
    pub fn unsave_resource(&mut self, id: Uuid) -> bool {
        let before = self.saved_resources.len();
        self.saved_resources.retain(|r| *r != id);
        let removed = self.saved_resources.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// UserView
// ---------------------------------------------------------------------------

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub onboarding_completed: bool,
    pub has_roadmap: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            onboarding_completed: u.onboarding_completed(),
            has_roadmap: u.roadmap.is_some(),
            created_at: u.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MakaamError::Validation("name is required".into()));
    }
    if !is_plausible_email(&normalize_email(email)) {
        return Err(MakaamError::Validation(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MakaamError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_profile() -> Profile {
        Profile {
            current_status: CurrentStatus::Student,
            education: "B.Tech Computer Science".into(),
            field_of_interest: "Web Development".into(),
            target_role: "Frontend Developer".into(),
            skills: vec!["HTML".into(), "CSS".into()],
            experience_level: Level::Beginner,
            weekly_hours: 10,
            timeline_months: 6,
            goals: "Land an internship".into(),
            learning_style: None,
        }
    }

    #[test]
    fn new_user_normalizes_email() {
        let u = User::new("Asha", "  Asha@Example.COM ", "hash", Role::User);
        assert_eq!(u.email, "asha@example.com");
        assert!(!u.onboarding_completed());
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration("Asha", "asha@example.com", "longenough").is_ok());
        assert!(validate_registration("", "asha@example.com", "longenough").is_err());
        assert!(validate_registration("Asha", "not-an-email", "longenough").is_err());
        assert!(validate_registration("Asha", "a@b", "longenough").is_err());
        assert!(validate_registration("Asha", "asha@example.com", "short").is_err());
    }

    #[test]
    fn onboarding_rejects_out_of_range_hours() {
        let mut u = User::new("Asha", "asha@example.com", "hash", Role::User);
        let mut p = sample_profile();
        p.weekly_hours = 0;
        let err = u.complete_onboarding(p).unwrap_err();
        assert!(matches!(err, MakaamError::Validation(_)));
        assert!(!u.onboarding_completed());
    }

    #[test]
    fn onboarding_normalizes_skills() {
        let mut u = User::new("Asha", "asha@example.com", "hash", Role::User);
        let mut p = sample_profile();
        p.skills = vec![" React ".into(), "react".into(), "".into(), "Git".into()];
        u.complete_onboarding(p).unwrap();
        assert_eq!(u.onboarding.unwrap().skills, vec!["React", "Git"]);
    }

    #[test]
    fn save_and_unsave_are_idempotent() {
        let mut u = User::new("Asha", "asha@example.com", "hash", Role::User);
        let id = Uuid::new_v4();
        assert!(u.save_resource(id));
        assert!(!u.save_resource(id));
        assert_eq!(u.saved_resources.len(), 1);
        assert!(u.unsave_resource(id));
        assert!(!u.unsave_resource(id));
    }

    #[test]
    fn view_hides_password_hash() {
        let u = User::new("Asha", "asha@example.com", "$2b$secret", Role::Admin);
        let json = serde_json::to_string(&u.view()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
