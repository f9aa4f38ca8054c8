//! A site: content definitions, content items and their map indexes over one database.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use contentforge_definitions::{
    ContentDefinitionDocument, DEFINITIONS_COLLECTION, DEFINITIONS_DOCUMENT_ID,
    InMemoryContentDefinitionManager,
};
use contentforge_indexing::{IndexEngine, LayerMetadataIndexProvider};
use contentforge_recipes::{ContentDefinitionStep, Recipe, RecipeExecutor, RecipeReport};
use contentforge_shared::{ContentForgeError, ContentItem, Result};
use contentforge_storage::{DocumentWrite, Storage};

use crate::content_step::ContentStep;

/// Collection holding content item documents.
pub const CONTENT_ITEMS_COLLECTION: &str = "content_items";

/// Outcome of [`Site::run_recipe`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeOutcome {
    pub report: RecipeReport,
    /// Whether the content definitions changed and were saved.
    pub definitions_saved: bool,
    /// Number of content items imported by `Content` steps.
    pub items_imported: usize,
}

/// Owns the storage handle, the definition manager and the index engine.
pub struct Site {
    storage: Storage,
    definitions: Arc<InMemoryContentDefinitionManager>,
    indexes: IndexEngine<ContentItem>,
    /// Definitions identifier as last written to storage.
    saved_identifier: u64,
}

impl Site {
    /// Open (or create) the site database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::from_storage(Storage::open(path).await?).await
    }

    /// Open a site backed by a private in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        Self::from_storage(Storage::open_in_memory().await?).await
    }

    async fn from_storage(storage: Storage) -> Result<Self> {
        let document = match storage
            .get_document(DEFINITIONS_COLLECTION, DEFINITIONS_DOCUMENT_ID)
            .await?
        {
            Some(stored) => serde_json::from_str::<ContentDefinitionDocument>(&stored.content)?,
            None => ContentDefinitionDocument::default(),
        };
        debug!(
            types = document.types.len(),
            parts = document.parts.len(),
            "loaded content definitions"
        );

        let saved_identifier = document.identifier;
        let indexes = IndexEngine::<ContentItem>::new().with_provider(&LayerMetadataIndexProvider);

        Ok(Self {
            storage,
            definitions: Arc::new(InMemoryContentDefinitionManager::from_document(document)),
            indexes,
            saved_identifier,
        })
    }

    /// The site's content definition manager.
    pub fn definitions(&self) -> &Arc<InMemoryContentDefinitionManager> {
        &self.definitions
    }

    /// Names of the map indexes maintained for content items.
    pub fn index_names(&self) -> Vec<&'static str> {
        self.indexes.index_names()
    }

    // -----------------------------------------------------------------------
    // Recipes & definitions
    // -----------------------------------------------------------------------

    /// Execute a recipe, then persist changed definitions and imported items.
    ///
    /// Definitions and items are written in one transaction. If a step fails,
    /// an imported item is invalid or the write fails, the in-memory
    /// definitions are rolled back and nothing is saved.
    #[instrument(skip_all, fields(recipe = %recipe.name))]
    pub async fn run_recipe(&mut self, recipe: &Recipe) -> Result<RecipeOutcome> {
        let snapshot = self.definitions.to_document();
        match self.apply_recipe(recipe).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "recipe failed, discarding definition changes");
                self.definitions.restore(snapshot);
                Err(e)
            }
        }
    }

    async fn apply_recipe(&mut self, recipe: &Recipe) -> Result<RecipeOutcome> {
        let content = ContentStep::new();
        let executor = RecipeExecutor::new()
            .with_handler(ContentDefinitionStep::new(self.definitions.clone()))
            .with_handler(content.clone());
        let report = executor.execute(recipe)?;

        let items = content.take_staged();
        let mut writes = Vec::with_capacity(items.len() + 1);

        let document = self.definitions.to_document();
        let definitions_saved = document.identifier != self.saved_identifier;
        if definitions_saved {
            writes.push(DocumentWrite::document(
                DEFINITIONS_COLLECTION,
                DEFINITIONS_DOCUMENT_ID,
                serde_json::to_string(&document)?,
            ));
        }
        for item in &items {
            writes.push(self.item_write(item)?);
        }

        self.storage.write_documents(&writes).await?;
        if definitions_saved {
            self.saved_identifier = document.identifier;
        }

        info!(
            steps = report.steps_executed,
            definitions_saved,
            items = items.len(),
            "recipe applied"
        );
        Ok(RecipeOutcome {
            report,
            definitions_saved,
            items_imported: items.len(),
        })
    }

    /// Write the definitions document if it changed since the last save.
    pub async fn save_definitions(&mut self) -> Result<bool> {
        let document = self.definitions.to_document();
        if document.identifier == self.saved_identifier {
            return Ok(false);
        }

        let json = serde_json::to_string(&document)?;
        self.storage
            .upsert_document(DEFINITIONS_COLLECTION, DEFINITIONS_DOCUMENT_ID, &json)
            .await?;
        self.saved_identifier = document.identifier;
        debug!(identifier = document.identifier, "saved content definitions");
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Content items
    // -----------------------------------------------------------------------

    /// Store an item and bring its index rows up to date, atomically.
    #[instrument(skip_all, fields(id = %item.content_item_id, content_type = %item.content_type))]
    pub async fn save_item(&self, item: &ContentItem) -> Result<()> {
        let write = self.item_write(item)?;
        self.storage.write_documents(std::slice::from_ref(&write)).await?;
        debug!(
            rows = write.index_rows.as_ref().map_or(0, Vec::len),
            "saved content item"
        );
        Ok(())
    }

    /// Validate an item and compute the write storing it with its index rows.
    fn item_write(&self, item: &ContentItem) -> Result<DocumentWrite> {
        if item.content_item_id.trim().is_empty() {
            return Err(ContentForgeError::validation("content item id must not be empty"));
        }
        if item.content_type.trim().is_empty() {
            return Err(ContentForgeError::validation(format!(
                "content item {} has no content type",
                item.content_item_id
            )));
        }

        let records = self.indexes.map(item)?;
        Ok(
            DocumentWrite::document(CONTENT_ITEMS_COLLECTION, &item.content_item_id, item.to_json()?)
                .with_index_rows(records),
        )
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<ContentItem>> {
        match self.storage.get_document(CONTENT_ITEMS_COLLECTION, id).await? {
            Some(stored) => Ok(Some(ContentItem::from_json(&stored.content)?)),
            None => Ok(None),
        }
    }

    /// Every stored item, soft-deleted ones included.
    pub async fn list_items(&self) -> Result<Vec<ContentItem>> {
        self.storage
            .list_documents(CONTENT_ITEMS_COLLECTION)
            .await?
            .iter()
            .map(|stored| ContentItem::from_json(&stored.content))
            .collect()
    }

    /// Mark an item removed. The document and its index rows are kept.
    #[instrument(skip(self))]
    pub async fn soft_delete_item(&self, id: &str) -> Result<ContentItem> {
        let mut item = self
            .get_item(id)
            .await?
            .ok_or_else(|| ContentForgeError::NotFound(format!("content item '{id}'")))?;
        item.soft_delete();
        self.save_item(&item).await?;
        Ok(item)
    }

    /// Remove an item and every index row derived from it.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> Result<()> {
        if !self
            .storage
            .delete_document(CONTENT_ITEMS_COLLECTION, id)
            .await?
        {
            return Err(ContentForgeError::NotFound(format!("content item '{id}'")));
        }
        self.storage.delete_index_rows(id).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Items whose layer metadata places them in `zone`.
    pub async fn items_in_zone(&self, zone: &str) -> Result<Vec<ContentItem>> {
        let ids = self.storage.layer_zone_documents(zone).await?;
        self.load_items(&ids).await
    }

    /// Items whose `index_name` row has `column == value`.
    pub async fn find_by_index(
        &self,
        index_name: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<ContentItem>> {
        let ids = self.storage.query_index(index_name, column, value).await?;
        self.load_items(&ids).await
    }

    async fn load_items(&self, ids: &[String]) -> Result<Vec<ContentItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_item(id).await? {
                Some(item) => items.push(item),
                None => warn!(id = %id, "index row points at a missing document"),
            }
        }
        Ok(items)
    }

    /// Rebuild every index row from the stored items. Returns the number of
    /// items processed.
    #[instrument(skip_all)]
    pub async fn reindex(&self) -> Result<usize> {
        for name in self.indexes.index_names() {
            self.storage.clear_index(name).await?;
        }

        let items = self.list_items().await?;
        for item in &items {
            let records = self.indexes.map(item)?;
            self.storage
                .replace_index_rows(&item.content_item_id, &records)
                .await?;
        }
        info!(items = items.len(), "rebuilt map indexes");
        Ok(items.len())
    }
}
