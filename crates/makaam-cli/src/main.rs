mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, resource::ResourceSubcommand, roadmap::RoadmapSubcommand,
    user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "makaam",
    about = "Career roadmaps, weekly check-ins and a curated resource library",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: nearest directory containing .makaam/, else cwd)
    #[arg(long, global = true, env = "MAKAAM_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, config and database
    Init {
        /// Register these emails as admins (repeatable)
        #[arg(long = "admin")]
        admins: Vec<String>,
    },

    /// Run the REST API server
    Serve {
        /// Port to listen on (overrides config and MAKAAM_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect accounts and change roles
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage the resource catalog
    Resource {
        #[command(subcommand)]
        subcommand: ResourceSubcommand,
    },

    /// Preview roadmaps without a running server
    Roadmap {
        #[command(subcommand)]
        subcommand: RoadmapSubcommand,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { admins } => cmd::init::run(&root, &admins),
        Commands::Serve { port, host } => cmd::serve::run(&root, port, host),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Resource { subcommand } => cmd::resource::run(&root, subcommand, cli.json),
        Commands::Roadmap { subcommand } => cmd::roadmap::run(subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
