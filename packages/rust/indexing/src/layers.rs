//! Map index over the layer placement of content items.

use contentforge_shared::{ContentItem, LayerMetadata};
use serde::{Deserialize, Serialize};

use crate::describe::{DescribeContext, IndexProvider, MapIndex};

/// One row per content item carrying [`LayerMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerMetadataIndex {
    /// `None` when the metadata names no zone.
    pub zone: Option<String>,
}

impl MapIndex for LayerMetadataIndex {
    const NAME: &'static str = "LayerMetadataIndex";
}

/// Describes [`LayerMetadataIndex`] over [`ContentItem`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerMetadataIndexProvider;

impl IndexProvider<ContentItem> for LayerMetadataIndexProvider {
    fn describe(&self, context: &mut DescribeContext<ContentItem>) {
        context
            .for_index::<LayerMetadataIndex>()
            .when(|item: &ContentItem| item.has::<LayerMetadata>())
            .map(|item: &ContentItem| {
                // Soft-deleted items keep their row: they are still contained items.
                let metadata = item.as_element::<LayerMetadata>()?;
                Some(LayerMetadataIndex {
                    zone: metadata.zone,
                })
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IndexEngine;
    use serde_json::json;

    fn engine() -> IndexEngine<ContentItem> {
        IndexEngine::<ContentItem>::new().with_provider(&LayerMetadataIndexProvider)
    }

    fn widget(zone: &str) -> ContentItem {
        let mut item = ContentItem::new("HtmlWidget");
        item.apply(&LayerMetadata::placed(zone, "Always")).unwrap();
        item
    }

    #[test]
    fn item_without_layer_metadata_has_no_row() {
        let item = ContentItem::new("Article");
        assert!(engine().map(&item).unwrap().is_empty());
    }

    #[test]
    fn item_with_layer_metadata_has_one_row() {
        let records = engine().map(&widget("Footer")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index_name, "LayerMetadataIndex");
        assert_eq!(
            records[0].decode::<LayerMetadataIndex>().unwrap(),
            LayerMetadataIndex {
                zone: Some("Footer".into())
            }
        );
    }

    #[test]
    fn soft_deleted_item_keeps_its_row() {
        let mut item = widget("Sidebar");
        item.published = true;
        item.soft_delete();

        let records = engine().map(&item).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values["Zone"], "Sidebar");
    }

    #[test]
    fn empty_zone_is_still_indexed() {
        let records = engine().map(&widget("")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values["Zone"], "");
    }

    #[test]
    fn null_members_still_produce_a_row() {
        let mut item = ContentItem::new("HtmlWidget");
        item.content.insert(
            "LayerMetadata".into(),
            json!({ "Zone": "Footer", "Layer": null, "Position": 0 }),
        );
        let records = engine().map(&item).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values["Zone"], "Footer");

        item.content
            .insert("LayerMetadata".into(), json!({ "Zone": null }));
        let records = engine().map(&item).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].decode::<LayerMetadataIndex>().unwrap(),
            LayerMetadataIndex { zone: None }
        );
    }

    #[test]
    fn unreadable_metadata_yields_no_row() {
        let mut item = ContentItem::new("HtmlWidget");
        item.content
            .insert("LayerMetadata".into(), json!({ "Zone": ["not", "a", "string"] }));
        assert!(engine().map(&item).unwrap().is_empty());
    }
}
