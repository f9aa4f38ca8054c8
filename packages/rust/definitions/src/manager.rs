//! Content definition manager trait and its in-memory implementation.

use std::sync::{PoisonError, RwLock};

use contentforge_shared::{ContentForgeError, Result};

use crate::builders::{ContentPartDefinitionBuilder, ContentTypeDefinitionBuilder};
use crate::models::{ContentDefinitionDocument, ContentPartDefinition, ContentTypeDefinition};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read and write access to content type and part definitions.
///
/// Methods take `&self`; implementations are shared between recipe step
/// handlers and the site that persists the result.
pub trait ContentDefinitionManager: Send + Sync {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition>;

    fn get_part_definition(&self, name: &str) -> Option<ContentPartDefinition>;

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition>;

    fn list_part_definitions(&self) -> Vec<ContentPartDefinition>;

    /// Insert or replace a type definition by name.
    fn store_type_definition(&self, definition: ContentTypeDefinition) -> Result<()>;

    /// Insert or replace a part definition by name.
    fn store_part_definition(&self, definition: ContentPartDefinition) -> Result<()>;

    fn delete_type_definition(&self, name: &str) -> Result<()>;

    /// Delete a part definition and detach it from every type that uses it.
    fn delete_part_definition(&self, name: &str) -> Result<()>;
}

/// Builder-based alteration on top of any [`ContentDefinitionManager`].
pub trait ContentDefinitionManagerExt: ContentDefinitionManager {
    /// Load (or create) type `name`, run `configure` on it, and store the result.
    ///
    /// A type that does not exist yet starts with its name as display name.
    fn alter_type_definition<F>(&self, name: &str, configure: F) -> Result<()>
    where
        F: FnOnce(&mut ContentTypeDefinitionBuilder),
    {
        let current = self
            .get_type_definition(name)
            .unwrap_or_else(|| ContentTypeDefinition::new(name, name));
        let mut builder = ContentTypeDefinitionBuilder::new(current);
        configure(&mut builder);
        self.store_type_definition(builder.build())
    }

    /// Load (or create) part `name`, run `configure` on it, and store the result.
    fn alter_part_definition<F>(&self, name: &str, configure: F) -> Result<()>
    where
        F: FnOnce(&mut ContentPartDefinitionBuilder),
    {
        let current = self
            .get_part_definition(name)
            .unwrap_or_else(|| ContentPartDefinition::new(name));
        let mut builder = ContentPartDefinitionBuilder::new(current);
        configure(&mut builder);
        self.store_part_definition(builder.build())
    }
}

impl<M: ContentDefinitionManager + ?Sized> ContentDefinitionManagerExt for M {}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Definition manager holding a [`ContentDefinitionDocument`] in memory.
#[derive(Debug, Default)]
pub struct InMemoryContentDefinitionManager {
    document: RwLock<ContentDefinitionDocument>,
}

impl InMemoryContentDefinitionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously persisted document.
    pub fn from_document(document: ContentDefinitionDocument) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }

    /// Snapshot the current definitions for persistence.
    pub fn to_document(&self) -> ContentDefinitionDocument {
        self.read(|doc| doc.clone())
    }

    /// Replace all definitions with `document`, e.g. to roll back a failed recipe.
    pub fn restore(&self, document: ContentDefinitionDocument) {
        let mut guard = self.document.write().unwrap_or_else(PoisonError::into_inner);
        *guard = document;
    }

    /// Mutation counter; changes whenever a definition is stored or deleted.
    pub fn identifier(&self) -> u64 {
        self.read(|doc| doc.identifier)
    }

    fn read<T>(&self, f: impl FnOnce(&ContentDefinitionDocument) -> T) -> T {
        let guard = self.document.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut ContentDefinitionDocument) -> T) -> T {
        let mut guard = self.document.write().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut guard);
        guard.identifier += 1;
        out
    }
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ContentForgeError::Definition(format!(
            "{kind} definition name must not be empty"
        )));
    }
    Ok(())
}

impl ContentDefinitionManager for InMemoryContentDefinitionManager {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition> {
        self.read(|doc| doc.types.iter().find(|t| t.name == name).cloned())
    }

    fn get_part_definition(&self, name: &str) -> Option<ContentPartDefinition> {
        self.read(|doc| doc.parts.iter().find(|p| p.name == name).cloned())
    }

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition> {
        self.read(|doc| doc.types.clone())
    }

    fn list_part_definitions(&self) -> Vec<ContentPartDefinition> {
        self.read(|doc| doc.parts.clone())
    }

    fn store_type_definition(&self, definition: ContentTypeDefinition) -> Result<()> {
        validate_name("type", &definition.name)?;
        for part in &definition.parts {
            validate_name("part", &part.part_name)?;
        }

        tracing::debug!(name = %definition.name, parts = definition.parts.len(), "storing type definition");
        self.write(|doc| {
            // Every attached part must resolve to a part definition.
            for part in &definition.parts {
                if !doc.parts.iter().any(|p| p.name == part.part_name) {
                    doc.parts.push(ContentPartDefinition::new(&part.part_name));
                }
            }
            let position = doc.types.iter().position(|t| t.name == definition.name);
            match position {
                Some(i) => doc.types[i] = definition,
                None => doc.types.push(definition),
            }
        });
        Ok(())
    }

    fn store_part_definition(&self, definition: ContentPartDefinition) -> Result<()> {
        validate_name("part", &definition.name)?;

        tracing::debug!(name = %definition.name, fields = definition.fields.len(), "storing part definition");
        self.write(|doc| {
            let position = doc.parts.iter().position(|p| p.name == definition.name);
            match position {
                Some(i) => doc.parts[i] = definition,
                None => doc.parts.push(definition),
            }
        });
        Ok(())
    }

    fn delete_type_definition(&self, name: &str) -> Result<()> {
        if self.get_type_definition(name).is_none() {
            return Err(ContentForgeError::NotFound(format!("content type '{name}'")));
        }
        self.write(|doc| doc.types.retain(|t| t.name != name));
        Ok(())
    }

    fn delete_part_definition(&self, name: &str) -> Result<()> {
        if self.get_part_definition(name).is_none() {
            return Err(ContentForgeError::NotFound(format!("content part '{name}'")));
        }
        self.write(|doc| {
            for ty in &mut doc.types {
                ty.parts.retain(|p| p.part_name != name);
            }
            doc.parts.retain(|p| p.name != name);
        });
        Ok(())
    }
}
