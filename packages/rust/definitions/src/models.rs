//! Content type and content part definition records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Schema of a content type: its display name, settings and attached parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentTypeDefinition {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Parts attached to the type, in display order.
    #[serde(default, rename = "ContentTypePartDefinitionRecords")]
    pub parts: Vec<ContentTypePartDefinition>,
}

impl ContentTypeDefinition {
    /// Create an empty type definition.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            settings: Map::new(),
            parts: Vec::new(),
        }
    }

    /// Find an attached part by its attachment name.
    pub fn part(&self, name: &str) -> Option<&ContentTypePartDefinition> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// A part attached to a content type.
///
/// `name` identifies the attachment; `part_name` is the part definition it
/// refers to. The two are equal unless the same part is attached more than
/// once under different names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentTypePartDefinition {
    pub name: String,
    pub part_name: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl ContentTypePartDefinition {
    pub fn new(name: impl Into<String>, part_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part_name: part_name.into(),
            settings: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// Schema of a reusable content part and its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentPartDefinition {
    pub name: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default, rename = "ContentPartFieldDefinitionRecords")]
    pub fields: Vec<ContentPartFieldDefinition>,
}

impl ContentPartDefinition {
    /// Create a part definition with no settings and no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: Map::new(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ContentPartFieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A field on a content part. `field_name` is the field type, e.g. `TextField`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentPartFieldDefinition {
    pub name: String,
    pub field_name: String,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Snapshot of every content definition, persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentDefinitionDocument {
    /// Bumped on every mutation.
    #[serde(default)]
    pub identifier: u64,
    #[serde(default, rename = "ContentTypeDefinitionRecords")]
    pub types: Vec<ContentTypeDefinition>,
    #[serde(default, rename = "ContentPartDefinitionRecords")]
    pub parts: Vec<ContentPartDefinition>,
}

/// Collection name under which the definitions document is stored.
pub const DEFINITIONS_COLLECTION: &str = "content_definitions";

/// Document id of the definitions document.
pub const DEFINITIONS_DOCUMENT_ID: &str = "ContentDefinitionDocument";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_uses_record_names() {
        let mut article = ContentTypeDefinition::new("Article", "Article");
        article
            .parts
            .push(ContentTypePartDefinition::new("TitlePart", "TitlePart"));
        let doc = ContentDefinitionDocument {
            identifier: 7,
            types: vec![article],
            parts: vec![ContentPartDefinition::new("TitlePart")],
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Identifier"], 7);
        assert_eq!(
            value["ContentTypeDefinitionRecords"][0]["ContentTypePartDefinitionRecords"][0]["PartName"],
            "TitlePart"
        );
        assert_eq!(value["ContentPartDefinitionRecords"][0]["Name"], "TitlePart");
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: ContentDefinitionDocument = serde_json::from_value(json!({})).unwrap();
        assert_eq!(doc, ContentDefinitionDocument::default());

        let part: ContentPartDefinition =
            serde_json::from_value(json!({ "Name": "BodyPart" })).unwrap();
        assert!(part.fields.is_empty());
        assert!(part.field("Body").is_none());
    }
}
