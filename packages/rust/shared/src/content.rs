//! Content item model and the elements attached to items.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Result;

// ---------------------------------------------------------------------------
// ContentElement
// ---------------------------------------------------------------------------

/// A named piece of data stored on a content item (a part or an aspect).
///
/// Elements are serialized under [`ContentElement::NAME`] at the top level of
/// the item's JSON document.
pub trait ContentElement: Serialize + DeserializeOwned {
    /// Key under which the element is stored on the item.
    const NAME: &'static str;
}

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// A versioned content document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentItem {
    /// Identifier shared by every version of the item.
    pub content_item_id: String,
    /// Identifier of this version.
    #[serde(default)]
    pub content_item_version_id: String,
    /// Name of the content type this item is an instance of.
    pub content_type: String,
    #[serde(default)]
    pub display_text: String,
    /// Whether this is the latest version.
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_utc: Option<DateTime<Utc>>,
    /// Elements keyed by name.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl ContentItem {
    /// Create a new, unpublished latest version of an item of `content_type`.
    pub fn new(content_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            content_item_id: new_id(),
            content_item_version_id: new_id(),
            content_type: content_type.into(),
            display_text: String::new(),
            latest: true,
            published: false,
            owner: None,
            author: None,
            created_utc: Some(now),
            modified_utc: Some(now),
            published_utc: None,
            content: Map::new(),
        }
    }

    /// Parse an item from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the item to its JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether the item carries element `T`.
    pub fn has<T: ContentElement>(&self) -> bool {
        matches!(self.content.get(T::NAME), Some(Value::Object(_)))
    }

    /// Deserialize element `T`. Returns `Ok(None)` when the element is absent.
    pub fn get<T: ContentElement>(&self) -> Result<Option<T>> {
        match self.content.get(T::NAME) {
            Some(value @ Value::Object(_)) => Ok(Some(T::deserialize(value)?)),
            _ => Ok(None),
        }
    }

    /// Like [`ContentItem::get`], but treats an undeserializable element as absent.
    pub fn as_element<T: ContentElement>(&self) -> Option<T> {
        match self.get::<T>() {
            Ok(element) => element,
            Err(e) => {
                tracing::warn!(
                    item = %self.content_item_id,
                    element = T::NAME,
                    error = %e,
                    "ignoring malformed content element"
                );
                None
            }
        }
    }

    /// Store element `T` on the item, replacing any previous value.
    pub fn apply<T: ContentElement>(&mut self, element: &T) -> Result<()> {
        self.content
            .insert(T::NAME.to_string(), serde_json::to_value(element)?);
        Ok(())
    }

    /// Remove element `T` from the item.
    pub fn remove<T: ContentElement>(&mut self) {
        self.content.remove(T::NAME);
    }

    /// Mark the item as removed without discarding the document.
    pub fn soft_delete(&mut self) {
        self.latest = false;
        self.published = false;
        self.modified_utc = Some(Utc::now());
    }

    /// Whether the item has been soft-deleted (neither latest nor published).
    pub fn is_soft_deleted(&self) -> bool {
        !self.latest && !self.published
    }
}

fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

// ---------------------------------------------------------------------------
// LayerMetadata
// ---------------------------------------------------------------------------

/// Placement of a content item inside a layer zone.
///
/// Every member may be missing or `null` in stored documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub render_title: bool,
    /// Ordering within the zone.
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: f64,
    /// Zone the item is rendered into.
    #[serde(default)]
    pub zone: Option<String>,
    /// Name of the layer whose rule controls visibility.
    #[serde(default)]
    pub layer: Option<String>,
}

impl LayerMetadata {
    /// Metadata placing an item in `zone` under `layer`.
    pub fn placed(zone: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
            layer: Some(layer.into()),
            ..Default::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContentElement for LayerMetadata {
    const NAME: &'static str = "LayerMetadata";
}
