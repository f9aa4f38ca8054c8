//! Application configuration for ContentForge.
//!
//! User config lives at `~/.contentforge/contentforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ContentForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contentforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contentforge";

// ---------------------------------------------------------------------------
// Config structs (matching contentforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Index maintenance settings.
    #[serde(default)]
    pub indexing: IndexingConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the site database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory searched for recipe files given by bare name.
    #[serde(default = "default_recipes_dir")]
    pub recipes_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            recipes_dir: default_recipes_dir(),
        }
    }
}

fn default_database_path() -> String {
    "var/contentforge.db".into()
}
fn default_recipes_dir() -> String {
    "recipes".into()
}

/// `[indexing]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Rebuild every map index when the site is opened.
    #[serde(default)]
    pub reindex_on_open: bool,
}

impl AppConfig {
    /// Resolve a recipe argument: existing paths are used as-is, bare names
    /// are looked up in `recipes_dir` with a `.recipe.json` suffix.
    pub fn resolve_recipe_path(&self, arg: &str) -> PathBuf {
        let direct = PathBuf::from(arg);
        if direct.exists() {
            return direct;
        }
        Path::new(&self.defaults.recipes_dir).join(format!("{arg}.recipe.json"))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contentforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContentForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contentforge/contentforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ContentForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContentForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContentForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContentForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("database_path"));
        assert!(toml_str.contains("reindex_on_open"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[indexing]
reindex_on_open = true
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.indexing.reindex_on_open);
        assert_eq!(config.defaults.database_path, "var/contentforge.db");
        assert_eq!(config.defaults.recipes_dir, "recipes");
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("cf_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[defaults]\ndatabase_path = \"/tmp/site.db\"\n").unwrap();
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.database_path, "/tmp/site.db");

        std::fs::write(&path, "[defaults\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn bare_recipe_names_resolve_into_recipes_dir() {
        let config = AppConfig::default();
        let resolved = config.resolve_recipe_path("blog-setup-that-does-not-exist");
        assert_eq!(
            resolved,
            Path::new("recipes").join("blog-setup-that-does-not-exist.recipe.json")
        );
    }
}
