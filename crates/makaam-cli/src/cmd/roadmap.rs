use crate::output::print_json;
use clap::Subcommand;
use makaam_core::roadmap;
use makaam_core::types::{CurrentStatus, Level};
use makaam_core::user::Profile;

/// Profile fields shared by the offline roadmap commands.
#[derive(clap::Args)]
pub struct ProfileArgs {
    /// Field of interest, e.g. "web development"
    #[arg(long)]
    field: String,
    /// Role the learner is aiming for
    #[arg(long)]
    target_role: String,
    /// student, graduate, working_professional, career_switcher
    #[arg(long, default_value = "student", value_parser = parse_status)]
    status: CurrentStatus,
    #[arg(long, default_value = "beginner")]
    level: Level,
    /// Timeline in months
    #[arg(long, default_value_t = 6)]
    months: u32,
    /// Study hours per week
    #[arg(long, default_value_t = 10)]
    hours: u32,
    /// Known skill (repeatable)
    #[arg(long = "skill")]
    skills: Vec<String>,
    #[arg(long, default_value = "")]
    goals: String,
}

impl ProfileArgs {
    fn into_profile(self) -> anyhow::Result<Profile> {
        let profile = Profile {
            current_status: self.status,
            education: String::new(),
            field_of_interest: self.field,
            target_role: self.target_role,
            skills: self.skills,
            experience_level: self.level,
            weekly_hours: self.hours,
            timeline_months: self.months,
            goals: self.goals,
            learning_style: None,
        }
        .normalized();
        profile.validate()?;
        Ok(profile)
    }
}

fn parse_status(s: &str) -> Result<CurrentStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
        .map_err(|_| format!("unknown status '{s}'"))
}

#[derive(Subcommand)]
pub enum RoadmapSubcommand {
    /// Print the built-in roadmap for a profile (no LLM call)
    Preview(ProfileArgs),

    /// Print the LLM prompt that would be sent for a profile
    Prompt(ProfileArgs),
}

pub fn run(subcmd: RoadmapSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RoadmapSubcommand::Preview(args) => preview(args.into_profile()?, json),
        RoadmapSubcommand::Prompt(args) => prompt(args.into_profile()?, json),
    }
}

fn preview(profile: Profile, json: bool) -> anyhow::Result<()> {
    let r = roadmap::fallback(&profile);
    if json {
        return print_json(&r);
    }

    println!("{}", r.title);
    if !r.summary.is_empty() {
        println!("{}", r.summary);
    }
    println!("{} weeks, {} milestones\n", r.duration_weeks, r.progress().total);
    for (i, phase) in r.phases.iter().enumerate() {
        println!("Phase {}: {} ({} weeks)", i + 1, phase.title, phase.duration_weeks);
        for m in &phase.milestones {
            println!("  [{}] {}", m.id, m.title);
        }
    }
    Ok(())
}

fn prompt(profile: Profile, json: bool) -> anyhow::Result<()> {
    let p = roadmap::build_prompt(&profile);
    if json {
        print_json(&serde_json::json!({ "system": p.system, "user": p.user }))
    } else {
        println!("--- system ---\n{}\n\n--- user ---\n{}", p.system, p.user);
        Ok(())
    }
}
