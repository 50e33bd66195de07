//! templist CLI: maintain the cargo-generate template catalog.
//!
//! The catalog is a markdown file (`TEMPLATES.md` by default) listing
//! templates as `* [name]: description, [author]` with link definitions for
//! every name and author. Commands:
//! `init`, `check`, `list`, `show`, `fmt`, `export`, `add`, and `remove`.
//!
//! Each command delegates to [`templist_core`]; this crate only handles
//! arguments, prompts, and terminal output.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "templist",
    about = "Maintain and check a cargo-generate template catalog",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to templist.config.json (default: ./templist.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file, overriding the config (default: TEMPLATES.md)
    #[arg(long, global = true, env = "TEMPLIST_CATALOG")]
    catalog: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a seed catalog and default config
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Check that every reference is defined, every URL is valid, and names are unique
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List templates
    List {
        /// Only show templates whose name, description, or author contains this text
        #[arg(long, short)]
        filter: Option<String>,

        /// Print resolved entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one template with its resolved links
    Show {
        /// Template name (case-insensitive)
        name: String,
    },

    /// Rewrite the catalog in canonical form
    Fmt {
        /// Report whether the file is canonical without writing it
        #[arg(long)]
        check: bool,

        /// Sort entries by name
        #[arg(long)]
        sort: bool,
    },

    /// Export resolved entries as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Add a template (prompts for missing fields)
    Add {
        /// Template name
        name: Option<String>,

        /// One-line description
        #[arg(long, short)]
        description: Option<String>,

        /// Author label
        #[arg(long, short)]
        author: Option<String>,

        /// Template repository URL
        #[arg(long)]
        url: Option<String>,

        /// Author profile URL (may be omitted when the author is already listed)
        #[arg(long)]
        author_url: Option<String>,
    },

    /// Remove a template and any links only it used
    Remove {
        /// Template name (case-insensitive)
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let open = || commands::Workspace::open(cli.config.as_deref(), cli.catalog.as_deref());

    match cli.command {
        Commands::Init { dir, force } => commands::init::run(&dir, force),
        Commands::Check { json } => commands::check::run(&open()?, json),
        Commands::List { filter, json } => commands::list::run(&open()?, filter.as_deref(), json),
        Commands::Show { name } => commands::show::run(&open()?, &name),
        Commands::Fmt { check, sort } => commands::fmt::run(&open()?, check, sort),
        Commands::Export { output } => commands::export::run(&open()?, output.as_deref()),
        Commands::Add {
            name,
            description,
            author,
            url,
            author_url,
        } => commands::add::run(
            &open()?,
            commands::add::AddArgs {
                name,
                description,
                author,
                url,
                author_url,
            },
        ),
        Commands::Remove { name } => commands::remove::run(&open()?, &name),
    }
}
