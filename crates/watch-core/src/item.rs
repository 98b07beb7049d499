//! Data types carried across collaborator seams.

use serde::{Deserialize, Serialize};

/// Product data returned by the catalog for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog identifier (normalized upper-case ASIN).
    pub asin: String,
    /// Display title.
    pub title: String,
    /// Canonical product page URL.
    pub url: String,
    /// Main product image, if any.
    pub image_url: Option<String>,
    /// Current offer price.
    pub price: f64,
    /// List price before any discount.
    pub full_price: f64,
    /// Whether the item is currently in stock.
    pub in_stock: bool,
    /// Whether the item is a preorder.
    pub preorder: bool,
}

/// A price change being delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDrop {
    /// Catalog identifier of the product.
    pub asin: String,
    /// Display title.
    pub title: String,
    /// Product page URL for the message body.
    pub url: String,
    /// Price before the drop.
    pub old_price: f64,
    /// Price after the drop.
    pub new_price: f64,
}

impl PriceDrop {
    /// Percentage decrease from `old_price` to `new_price`.
    ///
    /// Returns `0.0` when the old price is not positive, so a malformed
    /// record never produces a nonsensical percentage.
    pub fn percentage_change(&self) -> f64 {
        if self.old_price <= 0.0 {
            return 0.0;
        }
        (self.old_price - self.new_price) / self.old_price * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_with(old_price: f64, new_price: f64) -> PriceDrop {
        PriceDrop {
            asin: "B012345678".to_string(),
            title: "Widget".to_string(),
            url: "https://shop.example/dp/B012345678".to_string(),
            old_price,
            new_price,
        }
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(drop_with(100.0, 80.0).percentage_change(), 20.0);
        assert_eq!(drop_with(100.0, 100.0).percentage_change(), 0.0);
        assert_eq!(drop_with(50.0, 25.0).percentage_change(), 50.0);
    }

    #[test]
    fn test_percentage_change_zero_old_price() {
        assert_eq!(drop_with(0.0, 10.0).percentage_change(), 0.0);
    }
}
