//! Curated learning resources and the catalog filter.

use crate::error::{MakaamError, Result};
use crate::types::{Level, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub kind: ResourceKind,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_free")]
    pub free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_free() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub kind: ResourceKind,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_free")]
    pub free: bool,
}

impl NewResource {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MakaamError::Validation("title is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(MakaamError::Validation("category is required".into()));
        }
        validate_url(&self.url)
    }

    pub fn into_resource(self, created_by: Option<Uuid>) -> Result<Resource> {
        self.validate()?;
        let now = Utc::now();
        Ok(Resource {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            url: self.url.trim().to_string(),
            kind: self.kind,
            category: self.category.trim().to_string(),
            tags: clean_tags(self.tags),
            level: self.level,
            free: self.free,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update sent by admins; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub kind: Option<ResourceKind>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub level: Option<Level>,
    pub free: Option<bool>,
}

impl ResourcePatch {
    pub fn apply(self, resource: &mut Resource) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(MakaamError::Validation("title cannot be empty".into()));
            }
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(MakaamError::Validation("category cannot be empty".into()));
            }
        }
        if let Some(url) = &self.url {
            validate_url(url)?;
        }

        if let Some(title) = self.title {
            resource.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            resource.description = description.trim().to_string();
        }
        if let Some(url) = self.url {
            resource.url = url.trim().to_string();
        }
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        if let Some(category) = self.category {
            resource.category = category.trim().to_string();
        }
        if let Some(tags) = self.tags {
            resource.tags = clean_tags(tags);
        }
        if let Some(level) = self.level {
            resource.level = level;
        }
        if let Some(free) = self.free {
            resource.free = free;
        }
        resource.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_url(raw: &str) -> Result<()> {
    let raw = raw.trim();
    let web = url::Url::parse(raw).ok().filter(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    });
    match web {
        Some(_) => Ok(()),
        None => Err(MakaamError::Validation(format!(
            "url must be an http(s) link, got '{raw}'"
        ))),
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceFilter {
    /// Case-insensitive substring match on title, description and tags.
    pub q: Option<String>,
    pub category: Option<String>,
    pub kind: Option<ResourceKind>,
    pub level: Option<Level>,
    pub free: Option<bool>,
    pub tag: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, r: &Resource) -> bool {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = r.title.to_lowercase().contains(&q)
                || r.description.to_lowercase().contains(&q)
                || r.tags.iter().any(|t| t.contains(&q));
            if !hit {
                return false;
            }
        }
        if let Some(c) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !r.category.eq_ignore_ascii_case(c.trim()) {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !r.tags.iter().any(|t| t.eq_ignore_ascii_case(tag.trim())) {
                return false;
            }
        }
        if self.kind.is_some_and(|k| k != r.kind) {
            return false;
        }
        if self.level.is_some_and(|l| l != r.level) {
            return false;
        }
        if self.free.is_some_and(|f| f != r.free) {
            return false;
        }
        true
    }
}

/// Apply `filter`, sorted by title (case-insensitive).
pub fn filter_resources(resources: Vec<Resource>, filter: &ResourceFilter) -> Vec<Resource> {
    let mut out: Vec<Resource> = resources.into_iter().filter(|r| filter.matches(r)).collect();
    out.sort_by_key(|r| r.title.to_lowercase());
    out
}

// ---------------------------------------------------------------------------
// Catalog import
// ---------------------------------------------------------------------------

/// YAML catalog file: `resources: [ ... ]`.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub resources: Vec<NewResource>,
}

pub fn parse_catalog(yaml: &str) -> Result<Vec<NewResource>> {
    let catalog: Catalog = serde_yaml::from_str(yaml)?;
    for (i, r) in catalog.resources.iter().enumerate() {
        r.validate().map_err(|e| {
            MakaamError::Validation(format!("catalog entry {} ('{}'): {e}", i + 1, r.title))
        })?;
    }
    Ok(catalog.resources)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
