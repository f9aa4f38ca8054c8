//! Map indexes: declarative projections of documents into queryable rows.
//!
//! An [`IndexProvider`] describes, through a [`DescribeContext`], a predicate
//! and a projection for each index it owns. The [`IndexEngine`] evaluates
//! those descriptions per document, producing zero or one [`IndexRecord`]
//! per index.

pub mod describe;
pub mod engine;
pub mod layers;

pub use describe::{DescribeContext, IndexDescriptor, IndexProvider, IndexRecord, MapIndex};
pub use engine::IndexEngine;
pub use layers::{LayerMetadataIndex, LayerMetadataIndexProvider};
