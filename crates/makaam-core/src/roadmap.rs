//! Learning roadmaps: prompt construction, parsing of model output into the
//! fixed schema, and the built-in generator used when no model answer is usable.
//!
//! Model output is accepted in three shapes, tried in order:
//!   1. the whole reply is a JSON object
//!   2. a fenced ```json block somewhere in the reply
//!   3. the outermost `{ ... }` span of the reply
//!
//! Anything that still fails to produce at least one phase is a
//! [`MakaamError::RoadmapParse`] and the caller falls back to [`fallback`].

use crate::error::{MakaamError, Result};
use crate::types::{Level, RoadmapSource};
use crate::user::Profile;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Phase length used when the model omits one.
const DEFAULT_PHASE_WEEKS: u32 = 2;
const WEEKS_PER_MONTH: u32 = 4;
/// Ceiling for any duration read from a model reply (ten years).
const MAX_ROADMAP_WEEKS: u32 = 520;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_weeks: u32,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub target_role: String,
    pub duration_weeks: u32,
    pub phases: Vec<RoadmapPhase>,
    pub source: RoadmapSource,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub percent: u32,
}

impl Roadmap {
    pub fn milestones(&self) -> impl Iterator<Item = &Milestone> {
        self.phases.iter().flat_map(|p| p.milestones.iter())
    }

    fn milestone_mut(&mut self, id: &str) -> Option<&mut Milestone> {
        self.phases
            .iter_mut()
            .flat_map(|p| p.milestones.iter_mut())
            .find(|m| m.id == id)
    }

    pub fn has_milestone(&self, id: &str) -> bool {
        self.milestones().any(|m| m.id == id)
    }

    /// Mark a milestone done or not done. Returns the updated milestone.
    pub fn set_milestone(&mut self, id: &str, completed: bool) -> Result<&Milestone> {
        let m = self
            .milestone_mut(id)
            .ok_or_else(|| MakaamError::MilestoneNotFound(id.to_string()))?;
        if m.completed != completed {
            m.completed = completed;
            m.completed_at = completed.then(Utc::now);
        }
        Ok(m)
    }

    /// Mark every id as completed. Nothing changes unless all ids exist.
    pub fn complete_milestones(&mut self, ids: &[String]) -> Result<usize> {
        if let Some(missing) = ids.iter().find(|id| !self.has_milestone(id)) {
            return Err(MakaamError::MilestoneNotFound(missing.clone()));
        }
        let mut changed = 0;
        for id in ids {
            if let Some(m) = self.milestone_mut(id) {
                if !m.completed {
                    m.completed = true;
                    m.completed_at = Some(Utc::now());
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    pub fn progress(&self) -> Progress {
        let total = self.milestones().count();
        let completed = self.milestones().filter(|m| m.completed).count();
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u32
        };
        Progress {
            total,
            completed,
            percent,
        }
    }

    pub fn next_milestone(&self) -> Option<&Milestone> {
        self.milestones().find(|m| !m.completed)
    }
}

fn milestone_id(phase: usize, milestone: usize) -> String {
    format!("p{}-m{}", phase + 1, milestone + 1)
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const SYSTEM_PROMPT: &str = "You are an experienced career mentor who designs \
practical, week-by-week learning roadmaps. Reply with a single JSON object and \
nothing else. Do not wrap it in prose.";

const SCHEMA_HINT: &str = r#"{
  "title": "string",
  "summary": "string",
  "target_role": "string",
  "duration_weeks": number,
  "phases": [
    {
      "title": "string",
      "description": "string",
      "duration_weeks": number,
      "milestones": [
        {
          "title": "string",
          "description": "string",
          "skills": ["string"],
          "resources": ["string"]
        }
      ]
    }
  ]
}"#;

pub fn build_prompt(profile: &Profile) -> Prompt {
    let skills = if profile.skills.is_empty() {
        "none yet".to_string()
    } else {
        profile.skills.join(", ")
    };
    let mut user = format!(
        "Create a learning roadmap for someone who is {status}.\n\
         Education: {education}\n\
         Field of interest: {field}\n\
         Target role: {role}\n\
         Current skills: {skills}\n\
         Experience level: {level}\n\
         Available time: {hours} hours per week for {months} months \
         (about {weeks} weeks)\n",
        status = profile.current_status.describe(),
        education = or_unspecified(&profile.education),
        field = profile.field_of_interest,
        role = profile.target_role,
        level = profile.experience_level,
        hours = profile.weekly_hours,
        months = profile.timeline_months,
        weeks = profile.timeline_months * WEEKS_PER_MONTH,
    );
    if !profile.goals.is_empty() {
        user.push_str(&format!("Goals: {}\n", profile.goals));
    }
    if let Some(style) = &profile.learning_style {
        user.push_str(&format!("Preferred learning style: {style}\n"));
    }
    user.push_str(
        "\nSplit the plan into 3 to 5 phases with 2 to 4 concrete milestones each. \
         Phase durations must add up to the total duration. \
         Respond with JSON matching exactly this shape:\n",
    );
    user.push_str(SCHEMA_HINT);

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn or_unspecified(s: &str) -> &str {
    if s.trim().is_empty() {
        "not specified"
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("valid regex")
    })
}

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// Locate the JSON object inside a model reply.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(trimmed) {
        return Some(obj);
    }
    if let Some(caps) = fenced_json_re().captures(trimmed) {
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&caps[1]) {
            return Some(obj);
        }
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

/// Turn a model reply into a [`Roadmap`], defaulting what the model left out.
pub fn parse_response(text: &str, profile: &Profile) -> Result<Roadmap> {
    let mut obj = extract_json(text)
        .ok_or_else(|| MakaamError::RoadmapParse("no JSON object in response".into()))?;

    // Some models nest the payload one level down.
    if let Some(Value::Object(inner)) = obj.remove("roadmap") {
        obj = inner;
    }

    let raw_phases = first_of(&obj, &["phases", "stages", "steps"])
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut phases: Vec<RoadmapPhase> = raw_phases.iter().filter_map(parse_phase).collect();
    // Number phases and milestones after empty phases are dropped.
    for (i, phase) in phases.iter_mut().enumerate() {
        if phase.title.is_empty() {
            phase.title = format!("Phase {}", i + 1);
        }
        for (j, m) in phase.milestones.iter_mut().enumerate() {
            m.id = milestone_id(i, j);
        }
    }

    if phases.is_empty() {
        return Err(MakaamError::RoadmapParse(
            "response contained no usable phases".into(),
        ));
    }

    let target_role =
        str_of(&obj, &["target_role", "role"]).unwrap_or_else(|| profile.target_role.clone());
    let title =
        str_of(&obj, &["title", "name"]).unwrap_or_else(|| format!("Roadmap to {target_role}"));
    let summary = str_of(&obj, &["summary", "overview", "description"]).unwrap_or_default();

    let phase_total = phases
        .iter()
        .fold(0u32, |acc, p| acc.saturating_add(p.duration_weeks))
        .min(MAX_ROADMAP_WEEKS);
    let duration_weeks = first_of(&obj, &["duration_weeks", "total_weeks", "duration"])
        .and_then(lenient_u32)
        .filter(|w| (1..=MAX_ROADMAP_WEEKS).contains(w))
        .unwrap_or(if phase_total > 0 {
            phase_total
        } else {
            profile.timeline_months * WEEKS_PER_MONTH
        });

    Ok(Roadmap {
        title,
        summary,
        target_role,
        duration_weeks,
        phases,
        source: RoadmapSource::Llm,
        generated_at: Utc::now(),
    })
}

/// Titles may come back empty and ids are left blank; `parse_response`
/// numbers the phases it keeps.
fn parse_phase(value: &Value) -> Option<RoadmapPhase> {
    let obj = value.as_object()?;
    let title = str_of(obj, &["title", "name", "phase"]).unwrap_or_default();
    let description = str_of(obj, &["description", "summary", "focus"]).unwrap_or_default();
    let duration_weeks = first_of(obj, &["duration_weeks", "weeks", "duration"])
        .and_then(lenient_u32)
        .filter(|w| *w > 0)
        .map_or(DEFAULT_PHASE_WEEKS, |w| w.min(MAX_ROADMAP_WEEKS));

    let milestones: Vec<Milestone> = first_of(obj, &["milestones", "tasks", "topics", "steps"])
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(parse_milestone)
                .collect()
        })
        .unwrap_or_default();

    if milestones.is_empty() {
        return None;
    }

    Some(RoadmapPhase {
        title,
        description,
        duration_weeks,
        milestones,
    })
}

fn parse_milestone(value: &Value) -> Option<Milestone> {
    let (title, description, skills, resources) = match value {
        Value::String(s) if !s.trim().is_empty() => {
            (s.trim().to_string(), String::new(), Vec::new(), Vec::new())
        }
        Value::Object(obj) => (
            str_of(obj, &["title", "name", "milestone"])?,
            str_of(obj, &["description", "details"]).unwrap_or_default(),
            strings_of(obj, &["skills", "topics"]),
            strings_of(obj, &["resources", "links"]),
        ),
        _ => return None,
    };
    Some(Milestone {
        id: String::new(),
        title,
        description,
        skills,
        resources,
        completed: false,
        completed_at: None,
    })
}

fn first_of<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn str_of(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_of(obj, keys)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Accepts `["a", "b"]`, `[{"title": "a"}]` or `"a, b"`.
fn strings_of(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match first_of(obj, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(o) => str_of(o, &["title", "name", "url"]),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts `4`, `4.0` and `"4 weeks"`.
fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => leading_number_re()
            .find(s)
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Built-in generator
// ---------------------------------------------------------------------------

struct MilestoneTemplate {
    title: &'static str,
    description: &'static str,
    skills: &'static [&'static str],
    resources: &'static [&'static str],
}

struct PhaseTemplate {
    title: &'static str,
    description: &'static str,
    /// Relative share of the total timeline.
    weight: u32,
    /// Skipped for learners who already report advanced experience.
    foundational: bool,
    milestones: &'static [MilestoneTemplate],
}

struct Track {
    name: &'static str,
    keywords: &'static [&'static str],
    phases: &'static [PhaseTemplate],
}

const WEB_TRACK: Track = Track {
    name: "Web Development",
    keywords: &[
        "web", "frontend", "front-end", "backend", "back-end", "full stack", "fullstack",
        "react", "javascript", "node",
    ],
    phases: &[
        PhaseTemplate {
            title: "Web Foundations",
            description: "How the web works and the building blocks of every page.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "HTML and CSS fundamentals",
                    description: "Build and style static pages with semantic markup and responsive layouts.",
                    skills: &["HTML", "CSS", "Responsive design"],
                    resources: &["MDN Web Docs", "freeCodeCamp Responsive Web Design"],
                },
                MilestoneTemplate {
                    title: "JavaScript essentials",
                    description: "Variables, functions, the DOM and asynchronous code.",
                    skills: &["JavaScript", "DOM", "Promises"],
                    resources: &["javascript.info", "Eloquent JavaScript"],
                },
            ],
        },
        PhaseTemplate {
            title: "Frameworks and Tooling",
            description: "Component-based UI development and the everyday toolchain.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Version control with Git",
                    description: "Branching, pull requests and collaborating on GitHub.",
                    skills: &["Git", "GitHub"],
                    resources: &["Pro Git book"],
                },
                MilestoneTemplate {
                    title: "Build an app with React",
                    description: "Components, state, hooks and client-side routing.",
                    skills: &["React", "State management"],
                    resources: &["react.dev tutorial"],
                },
            ],
        },
        PhaseTemplate {
            title: "Backend and Data",
            description: "Serve data over HTTP and persist it.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "REST APIs",
                    description: "Design and implement a JSON API with authentication.",
                    skills: &["HTTP", "REST", "Node.js"],
                    resources: &["The Odin Project NodeJS course"],
                },
                MilestoneTemplate {
                    title: "Databases",
                    description: "Model data and query it from your API.",
                    skills: &["SQL", "MongoDB"],
                    resources: &["SQLBolt", "MongoDB University"],
                },
            ],
        },
        PhaseTemplate {
            title: "Portfolio and Job Readiness",
            description: "Ship real projects and prepare for interviews.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Capstone project",
                    description: "Deploy a full-stack project with a public URL and README.",
                    skills: &["Deployment", "Testing"],
                    resources: &["Vercel docs", "Render docs"],
                },
                MilestoneTemplate {
                    title: "Interview preparation",
                    description: "Practice data structures, system basics and behavioural questions.",
                    skills: &["Problem solving", "Communication"],
                    resources: &["Frontend Interview Handbook"],
                },
            ],
        },
    ],
};

const DATA_TRACK: Track = Track {
    name: "Data Science",
    keywords: &[
        "data", "machine learning", "ml", "ai", "analytics", "analyst", "statistics",
        "deep learning",
    ],
    phases: &[
        PhaseTemplate {
            title: "Programming and Math Foundations",
            description: "Python plus the statistics every analysis rests on.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "Python for data work",
                    description: "Core Python, notebooks and virtual environments.",
                    skills: &["Python", "Jupyter"],
                    resources: &["Python for Everybody"],
                },
                MilestoneTemplate {
                    title: "Statistics and probability",
                    description: "Distributions, hypothesis testing and linear algebra basics.",
                    skills: &["Statistics", "Probability", "Linear algebra"],
                    resources: &["Khan Academy Statistics", "3Blue1Brown Linear Algebra"],
                },
            ],
        },
        PhaseTemplate {
            title: "Data Wrangling and Visualisation",
            description: "Clean, explore and communicate data.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "pandas and SQL",
                    description: "Load, clean, join and aggregate real datasets.",
                    skills: &["pandas", "SQL"],
                    resources: &["Kaggle Learn pandas", "Mode SQL tutorial"],
                },
                MilestoneTemplate {
                    title: "Exploratory analysis",
                    description: "Tell a story with charts and summary statistics.",
                    skills: &["Matplotlib", "Seaborn", "Storytelling"],
                    resources: &["Kaggle Learn Data Visualization"],
                },
            ],
        },
        PhaseTemplate {
            title: "Machine Learning",
            description: "Train, evaluate and tune predictive models.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Supervised learning",
                    description: "Regression, classification and model evaluation.",
                    skills: &["scikit-learn", "Model evaluation"],
                    resources: &["Andrew Ng Machine Learning Specialization"],
                },
                MilestoneTemplate {
                    title: "Deep learning basics",
                    description: "Neural networks with a modern framework.",
                    skills: &["PyTorch", "Neural networks"],
                    resources: &["fast.ai Practical Deep Learning"],
                },
            ],
        },
        PhaseTemplate {
            title: "Portfolio and Job Readiness",
            description: "Publish end-to-end projects and prepare for interviews.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "End-to-end project",
                    description: "From raw data to a deployed model or dashboard.",
                    skills: &["Deployment", "Communication"],
                    resources: &["Streamlit docs"],
                },
                MilestoneTemplate {
                    title: "Kaggle competition",
                    description: "Enter a competition and write up your approach.",
                    skills: &["Feature engineering"],
                    resources: &["Kaggle"],
                },
            ],
        },
    ],
};

const DESIGN_TRACK: Track = Track {
    name: "UI/UX Design",
    keywords: &["design", "ux", "ui", "product designer", "figma", "user research"],
    phases: &[
        PhaseTemplate {
            title: "Design Foundations",
            description: "Visual principles and how users think.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "Visual design principles",
                    description: "Typography, colour, layout and hierarchy.",
                    skills: &["Typography", "Colour theory", "Layout"],
                    resources: &["Refactoring UI", "Google Material Design guidelines"],
                },
                MilestoneTemplate {
                    title: "UX fundamentals",
                    description: "Usability heuristics and user-centred design.",
                    skills: &["Usability", "Heuristics"],
                    resources: &["Nielsen Norman Group articles"],
                },
            ],
        },
        PhaseTemplate {
            title: "Tools and Prototyping",
            description: "Turn ideas into interactive prototypes.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Figma proficiency",
                    description: "Components, auto layout and design systems.",
                    skills: &["Figma", "Design systems"],
                    resources: &["Figma Learn"],
                },
                MilestoneTemplate {
                    title: "Wireframes to prototypes",
                    description: "Low- to high-fidelity flows for a real problem.",
                    skills: &["Wireframing", "Prototyping"],
                    resources: &["Google UX Design Certificate"],
                },
            ],
        },
        PhaseTemplate {
            title: "Research and Validation",
            description: "Learn from users and iterate.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "User research",
                    description: "Interviews, personas and journey maps.",
                    skills: &["User interviews", "Personas"],
                    resources: &["Just Enough Research"],
                },
                MilestoneTemplate {
                    title: "Usability testing",
                    description: "Plan, run and synthesise usability tests.",
                    skills: &["Usability testing", "Synthesis"],
                    resources: &["Maze guides"],
                },
            ],
        },
        PhaseTemplate {
            title: "Portfolio and Job Readiness",
            description: "Case studies that show your process.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Case studies",
                    description: "Write up two projects from problem to outcome.",
                    skills: &["Storytelling"],
                    resources: &["Behance", "Dribbble"],
                },
                MilestoneTemplate {
                    title: "Design critique practice",
                    description: "Present and defend your work in mock interviews.",
                    skills: &["Communication"],
                    resources: &["ADPList mentorship"],
                },
            ],
        },
    ],
};

const CLOUD_TRACK: Track = Track {
    name: "Cloud and DevOps",
    keywords: &[
        "cloud", "devops", "sre", "infrastructure", "aws", "azure", "gcp", "kubernetes",
        "platform engineer",
    ],
    phases: &[
        PhaseTemplate {
            title: "Systems Foundations",
            description: "Linux, networking and scripting.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "Linux and the shell",
                    description: "Processes, permissions, services and Bash scripting.",
                    skills: &["Linux", "Bash"],
                    resources: &["Linux Journey", "The Linux Command Line"],
                },
                MilestoneTemplate {
                    title: "Networking basics",
                    description: "TCP/IP, DNS, HTTP and TLS.",
                    skills: &["Networking", "DNS"],
                    resources: &["Computer Networking: A Top-Down Approach"],
                },
            ],
        },
        PhaseTemplate {
            title: "Containers and CI/CD",
            description: "Package software and automate delivery.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Docker",
                    description: "Images, containers and compose files.",
                    skills: &["Docker"],
                    resources: &["Docker docs: Get started"],
                },
                MilestoneTemplate {
                    title: "Continuous integration",
                    description: "Build, test and deploy pipelines.",
                    skills: &["GitHub Actions", "CI/CD"],
                    resources: &["GitHub Actions docs"],
                },
            ],
        },
        PhaseTemplate {
            title: "Cloud Platforms",
            description: "Run workloads on a major cloud provider.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Core cloud services",
                    description: "Compute, storage, IAM and networking on one provider.",
                    skills: &["AWS", "IAM"],
                    resources: &["AWS Skill Builder Cloud Practitioner"],
                },
                MilestoneTemplate {
                    title: "Infrastructure as code",
                    description: "Provision environments declaratively.",
                    skills: &["Terraform"],
                    resources: &["HashiCorp Terraform tutorials"],
                },
            ],
        },
        PhaseTemplate {
            title: "Operations and Job Readiness",
            description: "Observe, scale and certify.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Kubernetes and observability",
                    description: "Deploy to a cluster and add metrics, logs and alerts.",
                    skills: &["Kubernetes", "Monitoring"],
                    resources: &["Kubernetes docs tutorials"],
                },
                MilestoneTemplate {
                    title: "Certification",
                    description: "Prepare for an associate-level cloud certification.",
                    skills: &["Exam preparation"],
                    resources: &["AWS Solutions Architect Associate guide"],
                },
            ],
        },
    ],
};

const MOBILE_TRACK: Track = Track {
    name: "Mobile Development",
    keywords: &["mobile", "android", "ios", "flutter", "react native", "kotlin", "swift"],
    phases: &[
        PhaseTemplate {
            title: "Programming Foundations",
            description: "One mobile language, learned properly.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "Language fundamentals",
                    description: "Kotlin, Swift or Dart: types, collections, async code.",
                    skills: &["Kotlin", "Swift", "Dart"],
                    resources: &["Kotlin Koans", "Swift Playgrounds"],
                },
                MilestoneTemplate {
                    title: "Mobile UI basics",
                    description: "Layouts, navigation and platform guidelines.",
                    skills: &["UI layout", "Navigation"],
                    resources: &["Android Basics with Compose", "Hacking with Swift"],
                },
            ],
        },
        PhaseTemplate {
            title: "App Architecture",
            description: "Structure apps that stay maintainable.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "State and architecture patterns",
                    description: "MVVM, dependency injection and state management.",
                    skills: &["MVVM", "State management"],
                    resources: &["Guide to app architecture (Android)"],
                },
                MilestoneTemplate {
                    title: "Networking and persistence",
                    description: "Consume REST APIs and cache data locally.",
                    skills: &["REST", "SQLite"],
                    resources: &["Retrofit docs", "Core Data guide"],
                },
            ],
        },
        PhaseTemplate {
            title: "Quality and Release",
            description: "Test, profile and publish.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Testing",
                    description: "Unit and UI tests for critical flows.",
                    skills: &["Unit testing", "UI testing"],
                    resources: &["Testing in Jetpack Compose"],
                },
                MilestoneTemplate {
                    title: "Store release",
                    description: "Ship an app to the Play Store or App Store.",
                    skills: &["Release management"],
                    resources: &["Play Console help", "App Store Connect help"],
                },
            ],
        },
        PhaseTemplate {
            title: "Portfolio and Job Readiness",
            description: "Show published work and prepare for interviews.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Portfolio app",
                    description: "A polished app with source on GitHub.",
                    skills: &["Product thinking"],
                    resources: &["GitHub"],
                },
                MilestoneTemplate {
                    title: "Interview preparation",
                    description: "Platform internals and coding exercises.",
                    skills: &["Problem solving"],
                    resources: &["LeetCode"],
                },
            ],
        },
    ],
};

const GENERAL_TRACK: Track = Track {
    name: "Career Development",
    keywords: &[],
    phases: &[
        PhaseTemplate {
            title: "Explore and Orient",
            description: "Understand the role and the skills it needs.",
            weight: 2,
            foundational: true,
            milestones: &[
                MilestoneTemplate {
                    title: "Role research",
                    description: "Read job postings and talk to people already in the role.",
                    skills: &["Research", "Networking"],
                    resources: &["LinkedIn job search", "Informational interviews"],
                },
                MilestoneTemplate {
                    title: "Skill gap analysis",
                    description: "List required skills and rate yourself against each.",
                    skills: &["Self-assessment"],
                    resources: &["O*NET OnLine"],
                },
            ],
        },
        PhaseTemplate {
            title: "Core Skills",
            description: "Close the largest gaps first.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Structured course",
                    description: "Complete one reputable course covering the core skill set.",
                    skills: &["Domain knowledge"],
                    resources: &["Coursera", "edX"],
                },
                MilestoneTemplate {
                    title: "Practice project",
                    description: "Apply what you learned to a small real problem.",
                    skills: &["Applied practice"],
                    resources: &["Project-based learning communities"],
                },
            ],
        },
        PhaseTemplate {
            title: "Applied Experience",
            description: "Build evidence of your ability.",
            weight: 3,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Substantial project",
                    description: "A project you can walk an interviewer through.",
                    skills: &["Execution"],
                    resources: &["GitHub", "Medium"],
                },
                MilestoneTemplate {
                    title: "Community involvement",
                    description: "Volunteer, freelance or contribute to open source.",
                    skills: &["Collaboration"],
                    resources: &["Meetup", "Open source good-first-issues"],
                },
            ],
        },
        PhaseTemplate {
            title: "Job Readiness",
            description: "Package yourself and start applying.",
            weight: 2,
            foundational: false,
            milestones: &[
                MilestoneTemplate {
                    title: "Resume and online presence",
                    description: "A targeted resume and an up-to-date professional profile.",
                    skills: &["Resume writing", "Personal branding"],
                    resources: &["LinkedIn profile checklist"],
                },
                MilestoneTemplate {
                    title: "Interview practice",
                    description: "Mock interviews and a steady application routine.",
                    skills: &["Interviewing"],
                    resources: &["Pramp", "Glassdoor interview questions"],
                },
            ],
        },
    ],
};

const TRACKS: &[&Track] = &[
    &WEB_TRACK,
    &DATA_TRACK,
    &DESIGN_TRACK,
    &CLOUD_TRACK,
    &MOBILE_TRACK,
];

/// Pick the track whose keywords best match the profile's interest and role.
fn select_track(profile: &Profile) -> &'static Track {
    let haystack = format!(
        " {} {} ",
        profile.field_of_interest.to_lowercase(),
        profile.target_role.to_lowercase()
    );
    let words: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();

    let score = |track: &Track| -> usize {
        track
            .keywords
            .iter()
            .filter(|k| {
                if k.contains(' ') {
                    haystack.contains(*k)
                } else {
                    words.contains(k)
                }
            })
            .count()
    };

    TRACKS
        .iter()
        .copied()
        .map(|t| (score(t), t))
        .filter(|(s, _)| *s > 0)
        .max_by_key(|(s, _)| *s)
        .map(|(_, t)| t)
        .unwrap_or(&GENERAL_TRACK)
}

/// Split `total` weeks across phases by weight. Every phase gets at least one
/// week and the shares sum to `max(total, phases)`.
fn distribute_weeks(total: u32, weights: &[u32]) -> Vec<u32> {
    let n = weights.len() as u32;
    if n == 0 {
        return Vec::new();
    }
    let total = total.max(n);
    let weight_sum: u32 = weights.iter().sum::<u32>().max(1);
    let mut shares: Vec<u32> = weights
        .iter()
        .map(|w| (total * w / weight_sum).max(1))
        .collect();
    let mut assigned: u32 = shares.iter().sum();
    if assigned < total {
        if let Some(last) = shares.last_mut() {
            *last += total - assigned;
        }
    }
    // Rounding up to one week can overshoot; trim the longest phases.
    while assigned > total {
        let Some(longest) = shares.iter_mut().filter(|s| **s > 1).max_by_key(|s| **s) else {
            break;
        };
        *longest -= 1;
        assigned -= 1;
    }
    shares
}

/// Deterministic roadmap built from curated track templates.
pub fn fallback(profile: &Profile) -> Roadmap {
    let track = select_track(profile);
    let skip_foundations = profile.experience_level == Level::Advanced;
    let phases_src: Vec<&PhaseTemplate> = track
        .phases
        .iter()
        .filter(|p| !(skip_foundations && p.foundational))
        .collect();

    let total_weeks = profile.timeline_months.max(1) * WEEKS_PER_MONTH;
    let weights: Vec<u32> = phases_src.iter().map(|p| p.weight).collect();
    let weeks = distribute_weeks(total_weeks, &weights);

    let phases: Vec<RoadmapPhase> = phases_src
        .iter()
        .zip(weeks.iter())
        .enumerate()
        .map(|(i, (tpl, w))| RoadmapPhase {
            title: tpl.title.to_string(),
            description: tpl.description.to_string(),
            duration_weeks: *w,
            milestones: tpl
                .milestones
                .iter()
                .enumerate()
                .map(|(j, m)| Milestone {
                    id: milestone_id(i, j),
                    title: m.title.to_string(),
                    description: m.description.to_string(),
                    skills: m.skills.iter().map(|s| s.to_string()).collect(),
                    resources: m.resources.iter().map(|s| s.to_string()).collect(),
                    completed: false,
                    completed_at: None,
                })
                .collect(),
        })
        .collect();

    let duration_weeks = phases.iter().map(|p| p.duration_weeks).sum();
    let summary = format!(
        "A {duration_weeks}-week {track} plan toward {role}, paced for about \
         {hours} hours per week.",
        track = track.name,
        role = profile.target_role,
        hours = profile.weekly_hours,
    );

    Roadmap {
        title: format!("{} Roadmap: {}", track.name, profile.target_role),
        summary,
        target_role: profile.target_role.clone(),
        duration_weeks,
        phases,
        source: RoadmapSource::Fallback,
        generated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
