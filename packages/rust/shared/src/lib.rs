//! Shared types, error model, and configuration for ContentForge.
//!
//! This crate is the foundation depended on by all other ContentForge crates.
//! It provides:
//! - [`ContentForgeError`], the unified error type
//! - Content model ([`ContentItem`], [`ContentElement`], [`LayerMetadata`])
//! - JSON settings merging ([`merge_settings`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod content;
pub mod error;
pub mod settings;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, IndexingConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use content::{ContentElement, ContentItem, LayerMetadata};
pub use error::{ContentForgeError, Result};
pub use settings::merge_settings;
