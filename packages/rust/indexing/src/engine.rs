//! Runs described map indexes over documents.

use contentforge_shared::Result;
use tracing::{debug, trace};

use crate::describe::{DescribeContext, IndexProvider, IndexRecord};

/// Holds every index description registered by a set of providers.
pub struct IndexEngine<D> {
    context: DescribeContext<D>,
}

impl<D: 'static> IndexEngine<D> {
    pub fn new() -> Self {
        Self {
            context: DescribeContext::new(),
        }
    }

    /// Register a provider; its descriptions are collected immediately.
    pub fn with_provider(mut self, provider: &dyn IndexProvider<D>) -> Self {
        let before = self.context.descriptions.len();
        provider.describe(&mut self.context);
        debug!(
            added = self.context.descriptions.len() - before,
            "registered index descriptions"
        );
        self
    }

    /// Names of all registered indexes.
    pub fn index_names(&self) -> Vec<&'static str> {
        self.context.index_names()
    }

    /// Compute the index rows for one document.
    ///
    /// Each description contributes zero or one record.
    pub fn map(&self, document: &D) -> Result<Vec<IndexRecord>> {
        let mut records = Vec::new();
        for description in &self.context.descriptions {
            if let Some(record) = description.evaluate(document)? {
                records.push(record);
            }
        }
        trace!(rows = records.len(), "mapped document");
        Ok(records)
    }
}

impl<D: 'static> Default for IndexEngine<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::MapIndex;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct FirstWordIndex {
        word: String,
    }

    impl MapIndex for FirstWordIndex {
        const NAME: &'static str = "FirstWordIndex";
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WordCountIndex {
        count: usize,
    }

    impl MapIndex for WordCountIndex {
        const NAME: &'static str = "WordCountIndex";
    }

    struct SentenceIndexes;

    impl IndexProvider<String> for SentenceIndexes {
        fn describe(&self, context: &mut DescribeContext<String>) {
            context
                .for_index::<FirstWordIndex>()
                .map(|s: &String| {
                    s.split_whitespace().next().map(|w| FirstWordIndex { word: w.into() })
                });
            context
                .for_index::<WordCountIndex>()
                .when(|s: &String| s.contains(' '))
                .map(|s: &String| Some(WordCountIndex { count: s.split_whitespace().count() }));
        }
    }

    #[test]
    fn each_description_yields_at_most_one_row() {
        let engine = IndexEngine::<String>::new().with_provider(&SentenceIndexes);
        assert_eq!(engine.index_names(), vec!["FirstWordIndex", "WordCountIndex"]);

        let records = engine.map(&"hello big world".to_string()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].decode::<FirstWordIndex>().unwrap().word,
            "hello"
        );
        assert_eq!(records[1].decode::<WordCountIndex>().unwrap().count, 3);

        let records = engine.map(&"single".to_string()).unwrap();
        assert_eq!(records.len(), 1);

        assert!(engine.map(&String::new()).unwrap().is_empty());
    }

    #[test]
    fn empty_engine_maps_nothing() {
        let engine = IndexEngine::<String>::default();
        assert!(engine.map(&"anything".to_string()).unwrap().is_empty());
    }
}
