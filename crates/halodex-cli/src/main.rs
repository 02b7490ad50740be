//! `halodex`: browse and manage the Halo character catalog.
//!
//! Configuration comes from `HALODEX_*` environment variables (optionally
//! from a `.env` file); see [`catalog::CatalogConfig::from_env`].

mod render;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use catalog::{Catalog, CatalogConfig, ViewMode};
use clap::{Args, Parser, Subcommand};
use halodex_core::{
    AdvancedFilter, CategoryFilter, Character, Faction, NewCharacter, SortKey, ViewQuery,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "halodex")]
#[command(about = "Browse and manage the Halo character catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List characters, filtered and sorted
    List(ListArgs),

    /// Show one character in full
    Show { id: i64 },

    /// Add a character from a JSON file
    Add {
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace a character with the contents of a JSON file
    Update {
        id: i64,
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a character
    Delete { id: i64 },

    /// Toggle a character's favorite flag
    Favorite { id: i64 },

    /// Show, set or delete the note on a character
    Note {
        id: i64,

        /// New note text (empty text removes the note)
        #[arg(long, conflicts_with = "delete")]
        set: Option<String>,

        #[arg(long)]
        delete: bool,
    },

    /// Dashboard statistics
    Stats,

    /// Compare two characters attribute by attribute
    Compare { left: i64, right: i64 },

    /// Export the collection to a dated JSON file
    Export {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Import characters from a JSON array file
    Import { file: PathBuf },

    /// Delete every record and restore the built-in dataset
    Reset {
        #[arg(long)]
        yes: bool,
    },

    /// Show or set the list layout
    ViewMode { mode: Option<ViewMode> },

    /// Show or set the active tab
    Tab { name: Option<String> },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive text to find in name, species or affiliation
    search: Option<String>,

    /// all, favorites or a faction name
    #[arg(long, default_value = "all")]
    category: CategoryFilter,

    #[arg(long)]
    faction: Option<Faction>,

    /// Exact status
    #[arg(long)]
    status: Option<String>,

    /// Species substring
    #[arg(long)]
    species: Option<String>,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=10))]
    min_threat: u8,

    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=10))]
    max_threat: u8,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=10))]
    min_combat: u8,

    /// name, threat or faction
    #[arg(long, default_value = "name")]
    sort: SortKey,
}

impl ListArgs {
    fn query(self) -> ViewQuery {
        ViewQuery {
            search: self.search.unwrap_or_default(),
            category: self.category,
            advanced: AdvancedFilter {
                faction: self.faction,
                status: self.status,
                species: self.species,
                min_threat_level: self.min_threat,
                max_threat_level: self.max_threat,
                min_combat_skill: self.min_combat,
            },
            sort: self.sort,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = CatalogConfig::from_env()?;

    if let Some(path) = config.database_file() {
        create_parent(&path)?;
    }

    let mut catalog = Catalog::open(&config).await?;
    debug!("Running {:?}", cli.command);

    let result = execute(&mut catalog, cli.command).await;
    catalog.close().await;
    result
}

async fn execute(catalog: &mut Catalog, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List(args) => {
            let query = args.query();
            let labels = query.advanced.active_labels();
            if !labels.is_empty() {
                println!("Filters: {}", labels.join(", "));
            }

            let view = catalog.view(&query);
            if view.is_empty() {
                println!("No characters match.");
                return Ok(());
            }

            match catalog.view_mode() {
                ViewMode::List => {
                    for character in &view {
                        let favorite = catalog.is_favorite(character.id);
                        println!("{}", render::list_line(character, favorite));
                    }
                }
                ViewMode::Grid => {
                    let cells = view.iter().map(|c| (*c, catalog.is_favorite(c.id)));
                    println!("{}", render::grid(cells));
                }
            }
        }

        Command::Show { id } => {
            let character = catalog.get(id).await?;
            println!(
                "{}",
                render::details(&character, catalog.is_favorite(id), catalog.note(id))
            );
        }

        Command::Add { file } => {
            let new: NewCharacter = read_json(&file)?;
            let added = catalog.add(&new).await?;
            println!("Added #{} {}", added.id, added.name);
        }

        Command::Update { id, file } => {
            let new: NewCharacter = read_json(&file)?;
            catalog.update(&Character::new(id, new)).await?;
            println!("Updated #{}", id);
        }

        Command::Delete { id } => {
            if catalog.delete(id).await? {
                println!("Deleted #{}", id);
            } else {
                println!("No character #{}; nothing deleted", id);
            }
        }

        Command::Favorite { id } => {
            if catalog.toggle_favorite(id)? {
                println!("Added #{} to favorites", id);
            } else {
                println!("Removed #{} from favorites", id);
            }
        }

        Command::Note { id, set, delete } => {
            if delete {
                if catalog.delete_note(id) {
                    println!("Deleted note on #{}", id);
                } else {
                    println!("No note on #{}", id);
                }
            } else if let Some(text) = set {
                catalog.save_note(id, &text)?;
                println!("Saved note on #{}", id);
            } else {
                match catalog.note(id) {
                    Some(note) => println!("{}", note),
                    None => println!("No note on #{}", id),
                }
            }
        }

        Command::Stats => println!("{}", render::dashboard(&catalog.dashboard())),

        Command::Compare { left, right } => {
            println!("{}", render::comparison(&catalog.compare(left, right)?));
        }

        Command::Export { out } => {
            fs::create_dir_all(&out)?;
            let path = catalog.export_to(&out)?;
            println!(
                "Exported {} characters to {}",
                catalog.characters().len(),
                path.display()
            );
        }

        Command::Import { file } => {
            let text = fs::read_to_string(&file)?;
            let summary = catalog.import_json(&text).await?;
            println!("Imported {} characters", summary.imported);
        }

        Command::Reset { yes } => {
            if !yes {
                return Err("reset deletes every record; pass --yes to confirm".into());
            }
            catalog.reset().await?;
            println!(
                "Restored {} built-in characters",
                catalog.characters().len()
            );
        }

        Command::ViewMode { mode } => {
            if let Some(mode) = mode {
                catalog.set_view_mode(mode);
            }
            println!("{}", catalog.view_mode());
        }

        Command::Tab { name } => {
            if let Some(name) = name {
                catalog.set_active_tab(&name);
            }
            println!("{}", catalog.active_tab());
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
