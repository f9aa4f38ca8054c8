//! Builders used to alter content definitions in place.

use contentforge_shared::merge_settings;
use serde_json::Value;

use crate::models::{
    ContentPartDefinition, ContentPartFieldDefinition, ContentTypeDefinition,
    ContentTypePartDefinition,
};

// ---------------------------------------------------------------------------
// Type builders
// ---------------------------------------------------------------------------

/// Mutates a [`ContentTypeDefinition`].
#[derive(Debug, Clone)]
pub struct ContentTypeDefinitionBuilder {
    definition: ContentTypeDefinition,
}

impl ContentTypeDefinitionBuilder {
    pub fn new(definition: ContentTypeDefinition) -> Self {
        Self { definition }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn displayed_as(&mut self, display_name: impl Into<String>) -> &mut Self {
        self.definition.display_name = display_name.into();
        self
    }

    pub fn merge_settings(&mut self, settings: &Value) -> &mut Self {
        merge_settings(&mut self.definition.settings, settings);
        self
    }

    /// Attach `part_name` under `name`, or reconfigure an existing attachment.
    ///
    /// The configured attachment always ends up last.
    pub fn with_part<F>(&mut self, name: &str, part_name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ContentTypePartDefinitionBuilder),
    {
        let current = match self.definition.parts.iter().position(|p| p.name == name) {
            Some(i) => self.definition.parts.remove(i),
            None => ContentTypePartDefinition::new(name, part_name),
        };

        let mut builder = ContentTypePartDefinitionBuilder::new(current);
        configure(&mut builder);
        self.definition.parts.push(builder.build());
        self
    }

    pub fn remove_part(&mut self, name: &str) -> &mut Self {
        self.definition.parts.retain(|p| p.name != name);
        self
    }

    pub fn build(self) -> ContentTypeDefinition {
        self.definition
    }
}

/// Mutates one part attachment on a content type.
#[derive(Debug, Clone)]
pub struct ContentTypePartDefinitionBuilder {
    definition: ContentTypePartDefinition,
}

impl ContentTypePartDefinitionBuilder {
    pub fn new(definition: ContentTypePartDefinition) -> Self {
        Self { definition }
    }

    pub fn merge_settings(&mut self, settings: &Value) -> &mut Self {
        merge_settings(&mut self.definition.settings, settings);
        self
    }

    pub fn build(self) -> ContentTypePartDefinition {
        self.definition
    }
}

// ---------------------------------------------------------------------------
// Part builders
// ---------------------------------------------------------------------------

/// Mutates a [`ContentPartDefinition`].
#[derive(Debug, Clone)]
pub struct ContentPartDefinitionBuilder {
    definition: ContentPartDefinition,
}

impl ContentPartDefinitionBuilder {
    pub fn new(definition: ContentPartDefinition) -> Self {
        Self { definition }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn merge_settings(&mut self, settings: &Value) -> &mut Self {
        merge_settings(&mut self.definition.settings, settings);
        self
    }

    /// Add a field named `name`, or reconfigure it if it already exists.
    ///
    /// Like parts, a reconfigured field moves to the end.
    pub fn with_field<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ContentPartFieldDefinitionBuilder),
    {
        let current = match self.definition.fields.iter().position(|f| f.name == name) {
            Some(i) => self.definition.fields.remove(i),
            None => ContentPartFieldDefinition {
                name: name.to_string(),
                field_name: String::new(),
                settings: Default::default(),
            },
        };

        let mut builder = ContentPartFieldDefinitionBuilder::new(current);
        configure(&mut builder);
        self.definition.fields.push(builder.build());
        self
    }

    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.definition.fields.retain(|f| f.name != name);
        self
    }

    pub fn build(self) -> ContentPartDefinition {
        self.definition
    }
}

/// Mutates one field of a content part.
#[derive(Debug, Clone)]
pub struct ContentPartFieldDefinitionBuilder {
    definition: ContentPartFieldDefinition,
}

impl ContentPartFieldDefinitionBuilder {
    pub fn new(definition: ContentPartFieldDefinition) -> Self {
        Self { definition }
    }

    /// Set the field type, e.g. `TextField`.
    pub fn of_type(&mut self, field_name: impl Into<String>) -> &mut Self {
        self.definition.field_name = field_name.into();
        self
    }

    pub fn merge_settings(&mut self, settings: &Value) -> &mut Self {
        merge_settings(&mut self.definition.settings, settings);
        self
    }

    pub fn build(self) -> ContentPartFieldDefinition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_builder_sets_display_name_and_settings() {
        let mut builder =
            ContentTypeDefinitionBuilder::new(ContentTypeDefinition::new("Article", "Article"));
        builder
            .displayed_as("News Article")
            .merge_settings(&json!({ "ContentTypeSettings": { "Creatable": true } }));
        let def = builder.build();

        assert_eq!(def.display_name, "News Article");
        assert_eq!(def.settings["ContentTypeSettings"]["Creatable"], true);
    }

    #[test]
    fn with_part_moves_reconfigured_part_last() {
        let mut builder =
            ContentTypeDefinitionBuilder::new(ContentTypeDefinition::new("Article", "Article"));
        builder
            .with_part("TitlePart", "TitlePart", |p| {
                p.merge_settings(&json!({ "Position": "0" }));
            })
            .with_part("BodyPart", "BodyPart", |_| {})
            .with_part("TitlePart", "TitlePart", |p| {
                p.merge_settings(&json!({ "Options": "Editable" }));
            });
        let def = builder.build();

        assert_eq!(def.parts.len(), 2);
        assert_eq!(def.parts[0].name, "BodyPart");
        assert_eq!(def.parts[1].name, "TitlePart");
        assert_eq!(def.parts[1].settings["Position"], "0");
        assert_eq!(def.parts[1].settings["Options"], "Editable");
    }

    #[test]
    fn named_part_attachments() {
        let mut builder =
            ContentTypeDefinitionBuilder::new(ContentTypeDefinition::new("Product", "Product"));
        builder
            .with_part("Gallery", "BagPart", |_| {})
            .with_part("Related", "BagPart", |_| {});
        let def = builder.build();

        assert_eq!(def.part("Gallery").map(|p| p.part_name.as_str()), Some("BagPart"));
        assert_eq!(def.part("Related").map(|p| p.part_name.as_str()), Some("BagPart"));

        let mut builder = ContentTypeDefinitionBuilder::new(def);
        builder.remove_part("Gallery");
        assert!(builder.build().part("Gallery").is_none());
    }

    #[test]
    fn part_builder_adds_typed_fields() {
        let mut builder = ContentPartDefinitionBuilder::new(ContentPartDefinition::new("Article"));
        builder
            .merge_settings(&json!({ "ContentPartSettings": { "Attachable": true } }))
            .with_field("Subtitle", |f| {
                f.of_type("TextField")
                    .merge_settings(&json!({ "TextFieldSettings": { "Hint": "Shown below" } }));
            });
        let def = builder.build();

        let field = def.field("Subtitle").expect("field");
        assert_eq!(field.field_name, "TextField");
        assert_eq!(field.settings["TextFieldSettings"]["Hint"], "Shown below");
        assert_eq!(def.settings["ContentPartSettings"]["Attachable"], true);
    }

    #[test]
    fn with_field_keeps_type_unless_changed() {
        let mut builder = ContentPartDefinitionBuilder::new(ContentPartDefinition::new("Event"));
        builder.with_field("Starts", |f| {
            f.of_type("DateTimeField");
        });
        builder.with_field("Starts", |f| {
            f.merge_settings(&json!({ "Required": true }));
        });
        builder.remove_field("Missing");
        let def = builder.build();

        assert_eq!(def.fields.len(), 1);
        assert_eq!(def.fields[0].field_name, "DateTimeField");
        assert_eq!(def.fields[0].settings["Required"], true);
    }

    #[test]
    fn with_field_moves_reconfigured_field_last() {
        let mut builder = ContentPartDefinitionBuilder::new(ContentPartDefinition::new("Event"));
        builder
            .with_field("Starts", |f| {
                f.of_type("DateTimeField");
            })
            .with_field("Ends", |f| {
                f.of_type("DateTimeField");
            })
            .with_field("Starts", |_| {});
        let def = builder.build();

        let names: Vec<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Ends", "Starts"]);
        assert_eq!(def.fields[1].field_name, "DateTimeField");
    }
}
