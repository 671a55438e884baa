mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pixshelf_core::{Command, Config, Dispatcher, ImageStore};
use tracing_subscriber::EnvFilter;

/// pixshelf — image catalog bot
#[derive(Parser)]
#[command(name = "pixshelf", version, about)]
struct Cli {
    /// Path to config.json (token, botPrefix, catalogPath)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the catalog file (overrides catalogPath from the config)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the bot responds
    Ping,
    /// Show an image by ID or (partial) name
    Image {
        /// Image ID or part of its name
        identifier: String,
    },
    /// Post an image on someone's behalf
    Send {
        identifier: String,
        /// Mention shown as the sender
        #[arg(long)]
        author: Option<String>,
    },
    /// Add an image to the catalog
    #[command(name = "addimage")]
    AddImage {
        name: String,
        url: String,
        /// Category name (omit for uncategorized)
        category: Option<String>,
    },
    /// Remove an image by exact ID or name
    #[command(name = "delimage")]
    DelImage { identifier: String },
    /// List the images of one category
    List {
        category: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// List every image, grouped by category
    #[command(name = "listall")]
    ListAll {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Move an image to another category
    Classify { identifier: String, category: String },
    /// Show category names and codes
    Categories,
    /// Read prefixed text commands from stdin, one per line
    Listen {
        /// Command prefix (defaults to botPrefix from the config)
        #[arg(long)]
        prefix: Option<String>,
        /// Name used for `send` replies
        #[arg(long)]
        author: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("reading config {}", path.display()))
        }
        None => Config::load_or_default(&PathBuf::from("config.json"))
            .context("reading ./config.json"),
    }
}

/// `--prefix` wins unless it is blank; a blank prefix would turn every line into a command.
fn listen_prefix(flag: Option<String>, config: &Config) -> String {
    flag.filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| config.bot_prefix.clone())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let catalog_path = config.catalog_path(cli.catalog.as_deref());
    let dispatcher = Dispatcher::new(ImageStore::open(&catalog_path));

    let command = match cli.command {
        Commands::Listen { prefix, author } => {
            let prefix = listen_prefix(prefix, &config);
            return commands::listen::run(&dispatcher, &prefix, author.as_deref());
        }
        Commands::Send { identifier, author } => {
            return commands::run(&dispatcher, &Command::Send { identifier }, author.as_deref());
        }
        Commands::Ping => Command::Ping,
        Commands::Image { identifier } => Command::Lookup { identifier },
        Commands::AddImage {
            name,
            url,
            category,
        } => Command::AddImage {
            name,
            url,
            category,
        },
        Commands::DelImage { identifier } => Command::DeleteImage { identifier },
        Commands::List { category, page } => Command::ListCategory { category, page },
        Commands::ListAll { page } => Command::ListAll { page },
        Commands::Classify {
            identifier,
            category,
        } => Command::Reclassify {
            identifier,
            category,
        },
        Commands::Categories => Command::Categories,
    };

    commands::run(&dispatcher, &command, None)
}
