//! Content type and content part definitions for ContentForge.
//!
//! Definitions are plain records ([`ContentTypeDefinition`],
//! [`ContentPartDefinition`]) altered through builders and held by a
//! [`ContentDefinitionManager`].

pub mod builders;
pub mod manager;
pub mod models;

pub use builders::{
    ContentPartDefinitionBuilder, ContentPartFieldDefinitionBuilder,
    ContentTypeDefinitionBuilder, ContentTypePartDefinitionBuilder,
};
pub use manager::{
    ContentDefinitionManager, ContentDefinitionManagerExt, InMemoryContentDefinitionManager,
};
pub use models::{
    ContentDefinitionDocument, ContentPartDefinition, ContentPartFieldDefinition,
    ContentTypeDefinition, ContentTypePartDefinition, DEFINITIONS_COLLECTION,
    DEFINITIONS_DOCUMENT_ID,
};
