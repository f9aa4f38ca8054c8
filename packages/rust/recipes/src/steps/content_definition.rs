//! The `ContentDefinition` recipe step: creates or alters content types and parts.

use std::sync::Arc;

use contentforge_definitions::{ContentDefinitionManager, ContentDefinitionManagerExt};
use contentforge_shared::{ContentForgeError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::executor::{RecipeExecutionContext, RecipeStepHandler};

/// Step name handled by [`ContentDefinitionStep`].
pub const CONTENT_DEFINITION_STEP: &str = "ContentDefinition";

// ---------------------------------------------------------------------------
// Step payload
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentDefinitionStepModel {
    #[serde(default, alias = "contentTypes")]
    content_types: Vec<ContentTypeRecord>,
    #[serde(default, alias = "contentParts")]
    content_parts: Vec<ContentPartRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentTypeRecord {
    #[serde(alias = "name")]
    name: String,
    #[serde(default, alias = "displayName")]
    display_name: Option<String>,
    #[serde(default, alias = "settings")]
    settings: Value,
    #[serde(default, alias = "contentTypePartDefinitionRecords")]
    content_type_part_definition_records: Vec<ContentTypePartRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentTypePartRecord {
    #[serde(alias = "partName")]
    part_name: String,
    /// Attachment name; defaults to the part name.
    #[serde(default, alias = "name")]
    name: Option<String>,
    #[serde(default, alias = "settings")]
    settings: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentPartRecord {
    #[serde(alias = "name")]
    name: String,
    #[serde(default, alias = "settings")]
    settings: Value,
    #[serde(default, alias = "contentPartFieldDefinitionRecords")]
    content_part_field_definition_records: Vec<ContentPartFieldRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentPartFieldRecord {
    #[serde(alias = "fieldName")]
    field_name: String,
    #[serde(alias = "name")]
    name: String,
    #[serde(default, alias = "settings")]
    settings: Value,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Replays `ContentTypes` and `ContentParts` records against a
/// [`ContentDefinitionManager`].
///
/// Definitions that do not exist yet are created under the record's name; a
/// new type without a display name is displayed as its name. Types are
/// applied before parts.
pub struct ContentDefinitionStep {
    manager: Arc<dyn ContentDefinitionManager>,
}

impl ContentDefinitionStep {
    pub fn new(manager: Arc<dyn ContentDefinitionManager>) -> Self {
        Self { manager }
    }

    fn update_content_type(&self, record: &ContentTypeRecord) -> Result<()> {
        let display_name = record.display_name.as_deref().unwrap_or_default();

        if self.manager.get_type_definition(&record.name).is_none() {
            debug!(name = %record.name, "creating content type");
        }

        self.manager.alter_type_definition(&record.name, |builder| {
            // Settings ride along with the display name.
            if !display_name.is_empty() {
                builder.displayed_as(display_name);
                builder.merge_settings(&record.settings);
            }

            for part in &record.content_type_part_definition_records {
                let name = part.name.as_deref().unwrap_or(&part.part_name);
                builder.with_part(name, &part.part_name, |part_builder| {
                    part_builder.merge_settings(&part.settings);
                });
            }
        })
    }

    fn update_content_part(&self, record: &ContentPartRecord) -> Result<()> {
        if self.manager.get_part_definition(&record.name).is_none() {
            debug!(name = %record.name, "creating content part");
        }

        self.manager.alter_part_definition(&record.name, |builder| {
            builder.merge_settings(&record.settings);

            for field in &record.content_part_field_definition_records {
                builder.with_field(&field.name, |field_builder| {
                    field_builder.of_type(&field.field_name);
                    field_builder.merge_settings(&field.settings);
                });
            }
        })
    }
}

impl RecipeStepHandler for ContentDefinitionStep {
    fn handles(&self, step_name: &str) -> bool {
        step_name.eq_ignore_ascii_case(CONTENT_DEFINITION_STEP)
    }

    fn execute(&self, context: &RecipeExecutionContext) -> Result<()> {
        if !self.handles(&context.name) {
            return Ok(());
        }

        let step = ContentDefinitionStepModel::deserialize(&context.step).map_err(|e| {
            ContentForgeError::recipe(format!("invalid {CONTENT_DEFINITION_STEP} step: {e}"))
        })?;

        debug!(
            types = step.content_types.len(),
            parts = step.content_parts.len(),
            "applying content definitions"
        );

        for content_type in &step.content_types {
            self.update_content_type(content_type)?;
        }
        for content_part in &step.content_parts {
            self.update_content_part(content_part)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        CONTENT_DEFINITION_STEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentforge_definitions::InMemoryContentDefinitionManager;
    use serde_json::json;

    fn context(name: &str, step: Value) -> RecipeExecutionContext {
        RecipeExecutionContext {
            recipe_name: "Test".into(),
            name: name.into(),
            step,
            step_index: 0,
        }
    }

    fn setup() -> (Arc<InMemoryContentDefinitionManager>, ContentDefinitionStep) {
        let manager = Arc::new(InMemoryContentDefinitionManager::new());
        let step = ContentDefinitionStep::new(manager.clone());
        (manager, step)
    }

    fn article_step() -> Value {
        json!({
            "name": "ContentDefinition",
            "ContentTypes": [{
                "Name": "Article",
                "DisplayName": "Article",
                "Settings": { "ContentTypeSettings": { "Creatable": true, "Listable": true } },
                "ContentTypePartDefinitionRecords": [
                    { "PartName": "TitlePart", "Name": "TitlePart", "Settings": { "Position": "0" } },
                    { "PartName": "Article", "Name": "Article", "Settings": {} }
                ]
            }],
            "ContentParts": [{
                "Name": "Article",
                "Settings": { "ContentPartSettings": { "Attachable": false } },
                "ContentPartFieldDefinitionRecords": [
                    { "FieldName": "TextField", "Name": "Subtitle", "Settings": { "TextFieldSettings": { "Hint": "Short" } } }
                ]
            }]
        })
    }

    #[test]
    fn other_step_names_do_not_mutate() {
        let (manager, step) = setup();
        step.execute(&context("Content", article_step())).unwrap();
        step.execute(&context("ContentDefinitions", article_step())).unwrap();

        assert_eq!(manager.identifier(), 0);
        assert!(manager.list_type_definitions().is_empty());
        assert!(manager.list_part_definitions().is_empty());
    }

    #[test]
    fn step_name_is_case_insensitive() {
        let (manager, step) = setup();
        step.execute(&context("contentdefinition", article_step()))
            .unwrap();
        assert!(manager.get_type_definition("Article").is_some());
    }

    #[test]
    fn creates_types_and_parts() {
        let (manager, step) = setup();
        step.execute(&context("ContentDefinition", article_step()))
            .unwrap();

        let article = manager.get_type_definition("Article").expect("type");
        assert_eq!(article.display_name, "Article");
        assert_eq!(article.settings["ContentTypeSettings"]["Listable"], true);
        assert_eq!(article.parts.len(), 2);
        assert_eq!(article.parts[0].settings["Position"], "0");

        let part = manager.get_part_definition("Article").expect("part");
        let subtitle = part.field("Subtitle").expect("field");
        assert_eq!(subtitle.field_name, "TextField");
        assert_eq!(subtitle.settings["TextFieldSettings"]["Hint"], "Short");
        assert_eq!(part.settings["ContentPartSettings"]["Attachable"], false);

        assert!(manager.get_part_definition("TitlePart").is_some());
    }

    #[test]
    fn existing_definitions_are_altered_not_replaced() {
        let (manager, step) = setup();
        manager
            .alter_type_definition("Article", |b| {
                b.displayed_as("Old")
                    .merge_settings(&json!({ "Keep": "me" }))
                    .with_part("BodyPart", "BodyPart", |_| {});
            })
            .unwrap();

        step.execute(&context("ContentDefinition", article_step()))
            .unwrap();

        let article = manager.get_type_definition("Article").unwrap();
        assert_eq!(article.display_name, "Article");
        assert_eq!(article.settings["Keep"], "me");
        let names: Vec<_> = article.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["BodyPart", "TitlePart", "Article"]);
    }

    #[test]
    fn settings_are_skipped_without_display_name() {
        let (manager, step) = setup();
        step.execute(&context(
            "ContentDefinition",
            json!({
                "name": "ContentDefinition",
                "ContentTypes": [{
                    "Name": "Menu",
                    "Settings": { "ContentTypeSettings": { "Stereotype": "Menu" } },
                    "ContentTypePartDefinitionRecords": [ { "PartName": "MenuPart" } ]
                }]
            }),
        ))
        .unwrap();

        let menu = manager.get_type_definition("Menu").expect("created");
        assert_eq!(menu.name, "Menu");
        assert_eq!(menu.display_name, "Menu");
        assert!(menu.settings.is_empty());
        assert_eq!(menu.parts[0].name, "MenuPart");
    }

    #[test]
    fn bare_type_record_is_displayed_as_its_name() {
        let (manager, step) = setup();
        let bare = json!({ "name": "ContentDefinition", "ContentTypes": [{ "Name": "BlogPost" }] });
        step.execute(&context("ContentDefinition", bare.clone())).unwrap();
        assert_eq!(
            manager.get_type_definition("BlogPost").unwrap().display_name,
            "BlogPost"
        );

        manager
            .alter_type_definition("BlogPost", |builder| {
                builder.displayed_as("Blog Post");
            })
            .unwrap();
        step.execute(&context("ContentDefinition", bare)).unwrap();
        assert_eq!(
            manager.get_type_definition("BlogPost").unwrap().display_name,
            "Blog Post"
        );
    }

    #[test]
    fn null_settings_are_tolerated() {
        let (manager, step) = setup();
        step.execute(&context(
            "ContentDefinition",
            json!({
                "name": "ContentDefinition",
                "ContentParts": [{ "Name": "MarkdownBodyPart", "Settings": null }]
            }),
        ))
        .unwrap();
        let part = manager.get_part_definition("MarkdownBodyPart").unwrap();
        assert!(part.settings.is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let (manager, step) = setup();
        let err = step
            .execute(&context(
                "ContentDefinition",
                json!({ "name": "ContentDefinition", "ContentTypes": [{ "DisplayName": "No name" }] }),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("invalid ContentDefinition step"));
        assert!(manager.list_type_definitions().is_empty());
    }

    #[test]
    fn missing_collections_are_a_no_op() {
        let (manager, step) = setup();
        step.execute(&context(
            "ContentDefinition",
            json!({ "name": "ContentDefinition" }),
        ))
        .unwrap();
        assert_eq!(manager.identifier(), 0);
    }
}
