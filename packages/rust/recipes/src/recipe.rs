//! Recipe files: metadata plus an ordered list of named steps.

use std::path::Path;

use contentforge_shared::{ContentForgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed recipe file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "issetuprecipe")]
    pub is_setup_recipe: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw step objects; each carries at least a `name`.
    #[serde(default)]
    pub steps: Vec<Value>,
}

impl Recipe {
    /// Parse a recipe from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContentForgeError::recipe(format!("invalid recipe: {e}")))
    }

    /// Read and parse a recipe file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ContentForgeError::io(path, e))?;
        let recipe = Self::from_json(&content)?;
        tracing::debug!(?path, name = %recipe.name, steps = recipe.steps.len(), "loaded recipe");
        Ok(recipe)
    }
}
