//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use contentforge_core::Site;
use contentforge_definitions::ContentDefinitionManager;
use contentforge_recipes::Recipe;
use contentforge_shared::{AppConfig, ContentItem, config_file_path, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContentForge: declarative content schema and layer indexes.
#[derive(Parser)]
#[command(
    name = "contentforge",
    version,
    about = "Apply content recipes and query the layer metadata index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Site database path (overrides the config file).
    #[arg(long, global = true, env = "CONTENTFORGE_DB")]
    pub db: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Execute a recipe file (or a recipe name from the recipes directory).
    Recipe {
        /// Path to a recipe JSON file, or a bare recipe name.
        recipe: String,
    },

    /// List content type definitions.
    Types,

    /// List content part definitions.
    Parts,

    /// Content item operations.
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },

    /// List content items placed in a layer zone.
    Zone {
        /// Zone name, e.g. `Footer`.
        name: String,
    },

    /// Rebuild every map index from stored content items.
    Reindex,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Content item subcommands.
#[derive(Subcommand)]
pub(crate) enum ItemAction {
    /// Save content items from a JSON file (one item or an array).
    Put {
        /// Path to the JSON file.
        file: PathBuf,
    },
    /// Print a content item as JSON.
    Show {
        /// Content item ID.
        id: String,
    },
    /// Remove a content item. Soft-deletes unless `--hard` is given.
    Delete {
        /// Content item ID.
        id: String,

        /// Remove the document and its index rows.
        #[arg(long)]
        hard: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentforge=info",
        1 => "contentforge=debug",
        _ => "contentforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let db = cli.db;
    match cli.command {
        Command::Recipe { recipe } => cmd_recipe(db, &recipe).await,
        Command::Types => cmd_types(db).await,
        Command::Parts => cmd_parts(db).await,
        Command::Item { action } => match action {
            ItemAction::Put { file } => cmd_item_put(db, &file).await,
            ItemAction::Show { id } => cmd_item_show(db, &id).await,
            ItemAction::Delete { id, hard } => cmd_item_delete(db, &id, hard).await,
        },
        Command::Zone { name } => cmd_zone(db, &name).await,
        Command::Reindex => cmd_reindex(db).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Open the site at `--db`, or at the configured database path.
async fn open_site(db: Option<PathBuf>, config: &AppConfig) -> Result<Site> {
    let path = db.unwrap_or_else(|| PathBuf::from(&config.defaults.database_path));
    let site = Site::open(&path)
        .await
        .wrap_err_with(|| format!("cannot open site database {}", path.display()))?;

    if config.indexing.reindex_on_open {
        site.reindex().await?;
    }
    Ok(site)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_recipe(db: Option<PathBuf>, recipe: &str) -> Result<()> {
    let config = load_config()?;
    let path = config.resolve_recipe_path(recipe);
    let recipe = Recipe::load(&path)?;

    info!(path = %path.display(), name = %recipe.name, "running recipe");

    let mut site = open_site(db, &config).await?;
    let outcome = site.run_recipe(&recipe).await?;

    println!();
    println!("  Recipe applied: {}", recipe.name);
    println!("  Steps:       {}", outcome.report.steps_executed);
    println!("  Definitions: {}", if outcome.definitions_saved { "updated" } else { "unchanged" });
    println!("  Items:       {}", outcome.items_imported);
    if !outcome.report.unhandled_steps.is_empty() {
        println!("  Skipped:     {}", outcome.report.unhandled_steps.join(", "));
    }
    println!();

    Ok(())
}

async fn cmd_types(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;
    let types = site.definitions().list_type_definitions();

    if types.is_empty() {
        println!("No content types defined.");
        return Ok(());
    }

    for ty in types {
        let parts: Vec<String> = ty
            .parts
            .iter()
            .map(|p| {
                if p.name == p.part_name {
                    p.name.clone()
                } else {
                    format!("{} ({})", p.name, p.part_name)
                }
            })
            .collect();
        println!("{:<24} {:<24} {}", ty.name, ty.display_name, parts.join(", "));
    }
    Ok(())
}

async fn cmd_parts(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;
    let parts = site.definitions().list_part_definitions();

    if parts.is_empty() {
        println!("No content parts defined.");
        return Ok(());
    }

    for part in parts {
        let fields: Vec<String> = part
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.field_name))
            .collect();
        println!("{:<24} {}", part.name, fields.join(", "));
    }
    Ok(())
}

/// Parse a file holding either one content item or an array of them.
fn read_items(file: &Path) -> Result<Vec<ContentItem>> {
    let content = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("cannot read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("{} is not valid JSON", file.display()))?;

    let items = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        _ => vec![serde_json::from_value(value)?],
    };
    Ok(items)
}

async fn cmd_item_put(db: Option<PathBuf>, file: &Path) -> Result<()> {
    let items = read_items(file)?;
    let config = load_config()?;
    let site = open_site(db, &config).await?;

    for item in &items {
        site.save_item(item).await?;
        println!("saved {} ({})", item.content_item_id, item.content_type);
    }
    Ok(())
}

async fn cmd_item_show(db: Option<PathBuf>, id: &str) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;
    let item = site
        .get_item(id)
        .await?
        .ok_or_else(|| eyre!("no content item with id '{id}'"))?;

    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

async fn cmd_item_delete(db: Option<PathBuf>, id: &str, hard: bool) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;

    if hard {
        site.delete_item(id).await?;
        println!("deleted {id}");
    } else {
        site.soft_delete_item(id).await?;
        println!("removed {id} (index rows kept)");
    }
    Ok(())
}

async fn cmd_zone(db: Option<PathBuf>, zone: &str) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;
    let items = site.items_in_zone(zone).await?;

    if items.is_empty() {
        println!("Zone '{zone}' is empty.");
        return Ok(());
    }

    for item in items {
        let state = if item.is_soft_deleted() {
            "removed"
        } else if item.published {
            "published"
        } else {
            "draft"
        };
        println!(
            "{:<34} {:<20} {:<10} {}",
            item.content_item_id, item.content_type, state, item.display_text
        );
    }
    Ok(())
}

async fn cmd_reindex(db: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let site = open_site(db, &config).await?;
    let count = site.reindex().await?;
    println!("Reindexed {count} content items ({}).", site.index_names().join(", "));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("# {}", config_file_path()?.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_item_delete() {
        let cli = Cli::try_parse_from(["contentforge", "--db", "/tmp/x.db", "item", "delete", "abc", "--hard"])
            .expect("parse");
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/x.db")));
        match cli.command {
            Command::Item {
                action: ItemAction::Delete { id, hard },
            } => {
                assert_eq!(id, "abc");
                assert!(hard);
            }
            _ => panic!("expected item delete"),
        }
    }

    #[test]
    fn read_items_accepts_single_and_array() {
        let dir = std::env::temp_dir();
        let single = dir.join(format!("cf_item_{}.json", std::process::id()));
        std::fs::write(&single, r#"{ "ContentItemId": "a", "ContentType": "Article" }"#).unwrap();
        assert_eq!(read_items(&single).unwrap().len(), 1);

        std::fs::write(
            &single,
            r#"[{ "ContentItemId": "a", "ContentType": "Article" }, { "ContentItemId": "b", "ContentType": "Page" }]"#,
        )
        .unwrap();
        let items = read_items(&single).unwrap();
        assert_eq!(items[1].content_item_id, "b");
        std::fs::remove_file(&single).unwrap();
    }
}
