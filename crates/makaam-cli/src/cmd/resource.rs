use crate::cmd::open_store;
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use clap::Subcommand;
use makaam_core::resource::{self, NewResource, ResourceFilter};
use makaam_core::types::{Level, ResourceKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ResourceSubcommand {
    /// List library resources
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
        /// Only this level (beginner, intermediate, advanced)
        #[arg(long)]
        level: Option<Level>,
        /// Only this kind (course, article, video, book, tool, other)
        #[arg(long)]
        kind: Option<ResourceKind>,
        /// Only resources carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Search title, description and tags
        #[arg(long)]
        q: Option<String>,
    },

    /// Add a resource
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "course")]
        kind: ResourceKind,
        #[arg(long, default_value = "beginner")]
        level: Level,
        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark the resource as paid
        #[arg(long)]
        paid: bool,
    },

    /// Import resources from a YAML catalog (`resources: [...]`)
    Import {
        /// Catalog file
        file: PathBuf,
    },

    /// Delete a resource (also removes it from users' saved lists)
    Remove {
        /// Resource id
        id: Uuid,
    },
}

pub fn run(root: &Path, subcmd: ResourceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ResourceSubcommand::List {
            category,
            level,
            kind,
            tag,
            q,
        } => {
            let filter = ResourceFilter {
                q,
                category,
                kind,
                level,
                free: None,
                tag,
            };
            list(root, &filter, json)
        }
        ResourceSubcommand::Add {
            title,
            url,
            category,
            kind,
            level,
            tags,
            description,
            paid,
        } => {
            let new = NewResource {
                title,
                description,
                url,
                kind,
                category,
                tags,
                level,
                free: !paid,
            };
            add(root, new, json)
        }
        ResourceSubcommand::Import { file } => import(root, &file, json),
        ResourceSubcommand::Remove { id } => remove(root, id, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, filter: &ResourceFilter, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let resources = resource::filter_resources(store.list_resources()?, filter);

    if json {
        return print_json(&resources);
    }
    if resources.is_empty() {
        println!("No resources.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = resources
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                truncate(&r.title, 40),
                r.category.clone(),
                r.kind.to_string(),
                r.level.to_string(),
                if r.free { "free" } else { "paid" }.into(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "CATEGORY", "KIND", "LEVEL", "COST"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// add / import / remove
// ---------------------------------------------------------------------------

fn add(root: &Path, new: NewResource, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let resource = new.into_resource(None)?;
    store.insert_resource(&resource)?;

    if json {
        print_json(&resource)
    } else {
        println!("Added {} ({})", resource.title, resource.id);
        Ok(())
    }
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let yaml = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let entries = resource::parse_catalog(&yaml)
        .with_context(|| format!("invalid catalog {}", file.display()))?;

    let store = open_store(root)?;
    let mut known: HashSet<String> = store
        .list_resources()?
        .into_iter()
        .map(|r| r.url)
        .collect();

    let mut added = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        let url = entry.url.trim().to_string();
        if known.contains(&url) {
            skipped.push(url);
            continue;
        }
        let resource = entry.into_resource(None)?;
        store.insert_resource(&resource)?;
        known.insert(url);
        added.push(resource);
    }

    if json {
        print_json(&serde_json::json!({
            "added": added.len(),
            "skipped": skipped,
        }))
    } else {
        for r in &added {
            println!("  added:   {}", r.title);
        }
        for url in &skipped {
            println!("  skipped: {url} (already in library)");
        }
        println!("{} added, {} skipped", added.len(), skipped.len());
        Ok(())
    }
}

fn remove(root: &Path, id: Uuid, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    store.delete_resource(id)?;

    if json {
        print_json(&serde_json::json!({ "deleted": id }))
    } else {
        println!("Removed {id}");
        Ok(())
    }
}
