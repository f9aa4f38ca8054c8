//! Step handler trait and the executor that drives a recipe through it.

use contentforge_shared::{ContentForgeError, Result};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::recipe::Recipe;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// One step of a running recipe, as seen by step handlers.
#[derive(Debug, Clone)]
pub struct RecipeExecutionContext {
    /// Name of the recipe being executed.
    pub recipe_name: String,
    /// Step name (the step object's `name` property).
    pub name: String,
    /// Whole step object, including `name`.
    pub step: Value,
    /// Zero-based position of the step in the recipe.
    pub step_index: usize,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Handles recipe steps.
///
/// Every handler sees every step and must ignore steps it does not handle.
pub trait RecipeStepHandler: Send + Sync {
    /// Whether steps named `step_name` are handled here.
    fn handles(&self, step_name: &str) -> bool;

    /// Execute a step. Steps this handler does not handle are a no-op.
    fn execute(&self, context: &RecipeExecutionContext) -> Result<()>;

    /// Human-readable handler name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Outcome of a recipe execution.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeReport {
    pub recipe_name: String,
    /// Number of steps run.
    pub steps_executed: usize,
    /// Names of steps that no handler claimed, in recipe order.
    pub unhandled_steps: Vec<String>,
}

/// Runs recipe steps, in order, through registered handlers.
#[derive(Default)]
pub struct RecipeExecutor {
    handlers: Vec<Box<dyn RecipeStepHandler>>,
}

impl RecipeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers run in registration order.
    pub fn with_handler(mut self, handler: impl RecipeStepHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Execute every step of `recipe`. The first failing step aborts the run.
    #[instrument(skip_all, fields(recipe = %recipe.name))]
    pub fn execute(&self, recipe: &Recipe) -> Result<RecipeReport> {
        info!(steps = recipe.steps.len(), "executing recipe");
        let mut report = RecipeReport {
            recipe_name: recipe.name.clone(),
            ..Default::default()
        };

        for (index, step) in recipe.steps.iter().enumerate() {
            let name = step_name(index, step)?;
            let context = RecipeExecutionContext {
                recipe_name: recipe.name.clone(),
                name: name.to_string(),
                step: step.clone(),
                step_index: index,
            };

            if !self.handlers.iter().any(|h| h.handles(name)) {
                warn!(step = name, index, "no handler for recipe step");
                report.unhandled_steps.push(name.to_string());
            }

            for handler in &self.handlers {
                debug!(step = name, index, handler = handler.name(), "dispatching step");
                handler.execute(&context).map_err(|e| {
                    ContentForgeError::recipe(format!("step {index} ({name}) failed: {e}"))
                })?;
            }
            report.steps_executed += 1;
        }

        info!(
            executed = report.steps_executed,
            unhandled = report.unhandled_steps.len(),
            "recipe complete"
        );
        Ok(report)
    }
}

fn step_name(index: usize, step: &Value) -> Result<&str> {
    step.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ContentForgeError::recipe(format!("step {index} has no name")))
}
