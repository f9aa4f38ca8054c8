//! The `Content` recipe step: stages content items for import.

use std::sync::{Arc, Mutex, PoisonError};

use contentforge_recipes::{RecipeExecutionContext, RecipeStepHandler};
use contentforge_shared::{ContentForgeError, ContentItem, Result};
use serde::Deserialize;

/// Step name handled by [`ContentStep`].
pub const CONTENT_STEP: &str = "Content";

#[derive(Debug, Deserialize)]
struct ContentStepModel {
    #[serde(default, alias = "Data")]
    data: Vec<ContentItem>,
}

/// Collects the items of `Content` steps; the site saves them once the
/// recipe has run.
#[derive(Clone, Default)]
pub struct ContentStep {
    staged: Arc<Mutex<Vec<ContentItem>>>,
}

impl ContentStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every item staged so far.
    pub fn take_staged(&self) -> Vec<ContentItem> {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *staged)
    }
}

impl RecipeStepHandler for ContentStep {
    fn handles(&self, step_name: &str) -> bool {
        step_name.eq_ignore_ascii_case(CONTENT_STEP)
    }

    fn execute(&self, context: &RecipeExecutionContext) -> Result<()> {
        if !self.handles(&context.name) {
            return Ok(());
        }

        let step = ContentStepModel::deserialize(&context.step).map_err(|e| {
            ContentForgeError::recipe(format!("invalid {CONTENT_STEP} step: {e}"))
        })?;

        tracing::debug!(items = step.data.len(), "staging content items");
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(step.data);
        Ok(())
    }

    fn name(&self) -> &str {
        CONTENT_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(name: &str, step: serde_json::Value) -> RecipeExecutionContext {
        RecipeExecutionContext {
            recipe_name: "Test".into(),
            name: name.into(),
            step,
            step_index: 0,
        }
    }

    #[test]
    fn stages_items_until_taken() {
        let step = ContentStep::new();
        step.execute(&context(
            "Content",
            json!({
                "name": "Content",
                "data": [
                    { "ContentItemId": "w1", "ContentType": "HtmlWidget", "LayerMetadata": { "Zone": "Footer" } },
                    { "ContentItemId": "a1", "ContentType": "Article" }
                ]
            }),
        ))
        .unwrap();

        let staged = step.take_staged();
        assert_eq!(staged.len(), 2);
        assert_eq!(staged[0].content_item_id, "w1");
        assert!(step.take_staged().is_empty());
    }

    #[test]
    fn ignores_other_steps() {
        let step = ContentStep::new();
        step.execute(&context(
            "ContentDefinition",
            json!({ "name": "ContentDefinition", "data": [{ "ContentItemId": "x", "ContentType": "T" }] }),
        ))
        .unwrap();
        assert!(step.take_staged().is_empty());
    }

    #[test]
    fn items_without_ids_are_rejected() {
        let step = ContentStep::new();
        let err = step
            .execute(&context(
                "Content",
                json!({ "name": "Content", "data": [{ "ContentType": "Article" }] }),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("invalid Content step"));
    }
}
