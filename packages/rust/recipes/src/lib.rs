//! Recipes: declarative, named setup steps executed against a site.
//!
//! A [`Recipe`] is parsed from JSON and run by a [`RecipeExecutor`], which
//! hands each step to every registered [`RecipeStepHandler`].

pub mod executor;
pub mod recipe;
pub mod steps;

pub use executor::{RecipeExecutionContext, RecipeExecutor, RecipeReport, RecipeStepHandler};
pub use recipe::Recipe;
pub use steps::{CONTENT_DEFINITION_STEP, ContentDefinitionStep};
