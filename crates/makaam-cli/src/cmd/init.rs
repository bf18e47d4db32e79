use anyhow::Context;
use makaam_core::{config::Config, io, paths, store::Store, user};
use std::path::Path;

pub fn run(root: &Path, admins: &[String]) -> anyhow::Result<()> {
    println!("Initializing makaam in: {}", root.display());

    let data_dir = paths::data_dir(root);
    io::ensure_dir(&data_dir).with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = paths::config_path(root);
    let mut fresh = Config::new();
    fresh.auth.jwt_secret = Some(makaam_server::auth::random_secret());
    let yaml = serde_yaml::to_string(&fresh)?;
    let mut config = if io::write_if_missing(&config_path, yaml.as_bytes())
        .context("failed to write config.yaml")?
    {
        println!("  created: {}", paths::CONFIG_FILE);
        fresh
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to read existing config")?
    };

    let mut added = Vec::new();
    for email in admins {
        if !config.auth.is_admin_email(email) {
            config.auth.admin_emails.push(user::normalize_email(email));
            added.push(user::normalize_email(email));
        }
    }
    if !added.is_empty() {
        config.save(root).context("failed to update config.yaml")?;
        for email in &added {
            println!("  admin:   {email}");
        }
    }

    let db_path = paths::db_path(root);
    let existed = db_path.exists();
    Store::open(&db_path).with_context(|| format!("failed to open {}", db_path.display()))?;
    if existed {
        println!("  exists:  {}", paths::DB_FILE);
    } else {
        println!("  created: {}", paths::DB_FILE);
    }

    println!("\nNext: `makaam serve` (set OPENAI_API_KEY to enable LLM roadmaps)");
    Ok(())
}
