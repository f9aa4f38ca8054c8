//! Site orchestration for ContentForge.
//!
//! This crate ties storage, content definitions, recipes and map indexes
//! together behind [`Site`]: running recipes, saving content items, and
//! keeping their index rows current.

pub mod content_step;
pub mod site;

pub use content_step::{CONTENT_STEP, ContentStep};
pub use site::{CONTENT_ITEMS_COLLECTION, RecipeOutcome, Site};
