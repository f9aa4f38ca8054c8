//! Built-in recipe step handlers.

mod content_definition;

pub use content_definition::{CONTENT_DEFINITION_STEP, ContentDefinitionStep};
