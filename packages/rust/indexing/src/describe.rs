//! Declarative index descriptions: which documents map to which index rows.

use std::marker::PhantomData;

use contentforge_shared::{ContentForgeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Index rows
// ---------------------------------------------------------------------------

/// A row type in a map index: zero or one row per document.
pub trait MapIndex: Serialize + DeserializeOwned {
    /// Name of the index the rows belong to.
    const NAME: &'static str;
}

/// A type-erased index row ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub index_name: String,
    /// Row columns, as produced by serializing the [`MapIndex`] value.
    pub values: Map<String, Value>,
}

impl IndexRecord {
    /// Serialize a typed row into a record.
    pub fn from_index<I: MapIndex>(row: &I) -> Result<Self> {
        match serde_json::to_value(row)? {
            Value::Object(values) => Ok(Self {
                index_name: I::NAME.to_string(),
                values,
            }),
            other => Err(ContentForgeError::validation(format!(
                "index {} must serialize to an object, got {other}",
                I::NAME
            ))),
        }
    }

    /// Decode the record back into its typed row.
    pub fn decode<I: MapIndex>(&self) -> Result<I> {
        if self.index_name != I::NAME {
            return Err(ContentForgeError::validation(format!(
                "record belongs to index {}, not {}",
                self.index_name,
                I::NAME
            )));
        }
        Ok(I::deserialize(Value::Object(self.values.clone()))?)
    }
}

// ---------------------------------------------------------------------------
// Describe context
// ---------------------------------------------------------------------------

type Predicate<D> = Box<dyn Fn(&D) -> bool + Send + Sync>;
type Projection<D> = Box<dyn Fn(&D) -> Result<Option<IndexRecord>> + Send + Sync>;

/// One registered `when`/`map` pair.
pub(crate) struct IndexDescription<D> {
    pub index_name: &'static str,
    predicate: Predicate<D>,
    projection: Projection<D>,
}

impl<D> IndexDescription<D> {
    /// Evaluate against one document: `None` when the predicate rejects it or
    /// the projection yields nothing.
    pub fn evaluate(&self, document: &D) -> Result<Option<IndexRecord>> {
        if !(self.predicate)(document) {
            return Ok(None);
        }
        (self.projection)(document)
    }
}

/// Collects index descriptions from [`IndexProvider`]s.
pub struct DescribeContext<D> {
    pub(crate) descriptions: Vec<IndexDescription<D>>,
}

impl<D: 'static> DescribeContext<D> {
    pub fn new() -> Self {
        Self {
            descriptions: Vec::new(),
        }
    }

    /// Start describing index `I` over documents of type `D`.
    pub fn for_index<I: MapIndex + 'static>(&mut self) -> IndexDescriptor<'_, D, I> {
        IndexDescriptor {
            context: self,
            predicate: None,
            _index: PhantomData,
        }
    }

    /// Names of the described indexes, in registration order.
    pub fn index_names(&self) -> Vec<&'static str> {
        self.descriptions.iter().map(|d| d.index_name).collect()
    }
}

impl<D: 'static> Default for DescribeContext<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned by [`DescribeContext::for_index`].
///
/// Nothing is registered until [`IndexDescriptor::map`] is called.
pub struct IndexDescriptor<'a, D, I> {
    context: &'a mut DescribeContext<D>,
    predicate: Option<Predicate<D>>,
    _index: PhantomData<fn() -> I>,
}

impl<D: 'static, I: MapIndex + 'static> IndexDescriptor<'_, D, I> {
    /// Only documents matching `predicate` are mapped.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&D) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Project a document into at most one row and register the description.
    pub fn map<F>(self, projection: F)
    where
        F: Fn(&D) -> Option<I> + Send + Sync + 'static,
    {
        let predicate = self.predicate.unwrap_or_else(|| Box::new(|_: &D| true));
        let projection: Projection<D> = Box::new(move |document: &D| {
            projection(document)
                .map(|row| IndexRecord::from_index(&row))
                .transpose()
        });

        self.context.descriptions.push(IndexDescription {
            index_name: I::NAME,
            predicate,
            projection,
        });
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Declares one or more map indexes over documents of type `D`.
pub trait IndexProvider<D>: Send + Sync {
    fn describe(&self, context: &mut DescribeContext<D>);
}
