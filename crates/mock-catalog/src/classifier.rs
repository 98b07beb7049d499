//! Product classifier doubles.

use async_trait::async_trait;
use watch_core::{CatalogItem, ClassifyError, ProductClassifier};

/// A classifier that returns a fixed category for every item.
#[derive(Clone)]
pub struct StaticClassifier {
    category: String,
}

impl StaticClassifier {
    /// Create a classifier returning the given category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

#[async_trait]
impl ProductClassifier for StaticClassifier {
    async fn classify(&self, _item: &CatalogItem) -> Result<String, ClassifyError> {
        Ok(self.category.clone())
    }
}

/// A classifier that always fails, for exercising best-effort handling.
#[derive(Clone, Copy, Default)]
pub struct FailingClassifier;

#[async_trait]
impl ProductClassifier for FailingClassifier {
    async fn classify(&self, _item: &CatalogItem) -> Result<String, ClassifyError> {
        Err(ClassifyError::Unavailable(
            "simulated classifier outage".to_string(),
        ))
    }
}
