use crate::cmd::open_store;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use makaam_core::types::Role;
use std::path::Path;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// List registered accounts
    List,

    /// Grant the admin role
    Promote {
        /// Account email
        email: String,
    },

    /// Revoke the admin role
    Demote {
        /// Account email
        email: String,
    },
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::List => list(root, json),
        UserSubcommand::Promote { email } => set_role(root, &email, Role::Admin, json),
        UserSubcommand::Demote { email } => set_role(root, &email, Role::User, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let users = store.list_users()?;

    if json {
        let views: Vec<_> = users.iter().map(|u| u.view()).collect();
        return print_json(&views);
    }
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            let progress = u
                .roadmap
                .as_ref()
                .map(|r| format!("{}%", r.progress().percent))
                .unwrap_or_else(|| "-".into());
            vec![
                u.email.clone(),
                u.name.clone(),
                u.role.to_string(),
                if u.onboarding_completed() { "yes" } else { "no" }.into(),
                progress,
                u.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(
        &["EMAIL", "NAME", "ROLE", "ONBOARDED", "PROGRESS", "JOINED"],
        rows,
    );
    Ok(())
}

fn set_role(root: &Path, email: &str, role: Role, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let user = store
        .find_user_by_email(email)?
        .with_context(|| format!("no user with email '{email}'"))?;

    let changed = user.role != role;
    if changed {
        store.modify_user(user.id, |u| {
            u.role = role;
            Ok(())
        })?;
    }

    if json {
        print_json(&serde_json::json!({
            "email": user.email,
            "role": role,
            "changed": changed,
        }))
    } else {
        if changed {
            println!("{} is now {}", user.email, role);
        } else {
            println!("{} is already {}", user.email, role);
        }
        Ok(())
    }
}
