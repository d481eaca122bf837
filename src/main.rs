//! # mdexplore CLI (`mdx`)
//!
//! The `mdx` binary drives the markdown explorer backend: database
//! initialization, directory import, group listing, model listing, and the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! mdx --config ./config/mdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mdx init` | Create the SQLite database and run schema migrations |
//! | `mdx import <dir> --name <group>` | Import a directory as a content group |
//! | `mdx groups` | List the acting user's content groups |
//! | `mdx models` | List registered summarization models |
//! | `mdx serve` | Start the JSON HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mdexplore::provider::ProviderRegistry;
use mdexplore::{config, db, groups, import, migrate, server};

/// mdexplore CLI — a markdown document explorer backend with cached AI
/// summaries.
#[derive(Parser)]
#[command(
    name = "mdx",
    about = "mdexplore — a markdown document explorer backend with cached AI summaries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (users, content_groups, documents, summaries). Idempotent.
    Init,

    /// Import a directory of markdown files as a new content group.
    Import {
        /// Directory to scan.
        dir: PathBuf,
        /// Name of the content group to create.
        #[arg(long)]
        name: String,
    },

    /// List the acting user's content groups.
    Groups,

    /// List registered summarization models.
    Models,

    /// Start the JSON HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&config).await?;
            println!("Database initialized at {}", config.db.path.display());
        }
        Commands::Import { dir, name } => {
            let files = import::scan_directory(&config.import, &dir)?;
            let file_count = files.iter().filter(|f| !f.is_directory).count();

            let pool = db::connect(&config).await?;
            migrate::apply_schema(&pool).await?;
            let user =
                groups::ensure_user(&pool, &config.user.email, config.user.name.as_deref()).await?;
            let created = groups::create_group(&pool, &user.id, &name, &files).await?;
            pool.close().await;

            println!(
                "Created content group '{}' ({}) with {} documents",
                created.group.name, created.group.id, file_count
            );
        }
        Commands::Groups => {
            let pool = db::connect(&config).await?;
            let user =
                groups::ensure_user(&pool, &config.user.email, config.user.name.as_deref()).await?;
            let list = groups::list_groups(&pool, &user.id).await?;
            pool.close().await;

            if list.is_empty() {
                println!("No content groups yet. Try: mdx import <dir> --name <group>");
            }
            for group in list {
                println!("{}  {}", group.id, group.name);
            }
        }
        Commands::Models => {
            let registry = ProviderRegistry::with_defaults(&config.summarizer);
            for (id, info) in registry.models() {
                println!("{}  {} — {}", id, info.name, info.description);
            }
        }
        Commands::Serve => {
            migrate::run_migrations(&config).await?;
            server::run_server(&config).await?;
        }
    }

    Ok(())
}
