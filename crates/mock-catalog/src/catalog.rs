//! In-memory catalog doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watch_core::{CatalogError, CatalogItem, CatalogLookup};

/// An in-memory catalog backed by a map of items.
///
/// Prices can be changed between calls to simulate drops, and the number
/// of batch lookups is counted so tests can assert batching behavior.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    items: Arc<Mutex<HashMap<String, CatalogItem>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub fn insert(&self, item: CatalogItem) {
        self.items
            .lock()
            .unwrap()
            .insert(item.asin.clone(), item);
    }

    /// Change the current price of an existing item.
    ///
    /// Unknown identifiers are ignored.
    pub fn set_price(&self, asin: &str, price: f64) {
        if let Some(item) = self.items.lock().unwrap().get_mut(asin) {
            item.price = price;
        }
    }

    /// Remove an item, so subsequent lookups treat it as not found.
    pub fn remove(&self, asin: &str) {
        self.items.lock().unwrap().remove(asin);
    }

    /// How many batch lookup calls have been made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn get_products(
        &self,
        asins: &[String],
    ) -> Result<HashMap<String, CatalogItem>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.lock().unwrap();
        Ok(asins
            .iter()
            .filter_map(|asin| items.get(asin).map(|item| (asin.clone(), item.clone())))
            .collect())
    }

    fn name(&self) -> &str {
        "StaticCatalog"
    }
}

/// A catalog whose lookups always fail, for exercising retry paths.
#[derive(Clone, Default)]
pub struct FailingCatalog {
    calls: Arc<AtomicUsize>,
}

impl FailingCatalog {
    /// Create a new failing catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many batch lookup calls have been attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogLookup for FailingCatalog {
    async fn get_products(
        &self,
        _asins: &[String],
    ) -> Result<HashMap<String, CatalogItem>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Http("simulated catalog outage".to_string()))
    }

    fn name(&self) -> &str {
        "FailingCatalog"
    }
}
