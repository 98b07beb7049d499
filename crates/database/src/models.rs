//! Database models.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The kind of work a pending action represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActionType {
    /// Start monitoring a product submitted as a URL.
    AddProduct,
    /// Re-check a known product's price.
    CheckProduct,
    /// Notify subscribers about a price drop.
    NotifyPrice,
    /// Link a chat identity to a web account.
    LinkAccounts,
}

impl ActionType {
    /// Stable string form, matching the stored column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddProduct => "add_product",
            Self::CheckProduct => "check_product",
            Self::NotifyPrice => "notify_price",
            Self::LinkAccounts => "link_accounts",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted unit of pending or completed work.
///
/// Once `is_processed` is set the action is retained for audit and never
/// re-dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Action {
    /// Auto-incrementing ID.
    pub id: i64,
    /// The action type, used for dispatch.
    pub action_type: ActionType,
    /// String payload: a URL for add_product, a product identifier for
    /// check_product/notify_price.
    pub value: String,
    /// Submitting user, required for add_product.
    pub user_id: Option<String>,
    /// Whether a processor has consumed this action.
    pub is_processed: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// Per-type scheduler configuration. At most one row per action type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActionConfig {
    /// The action type this config applies to.
    pub action_type: ActionType,
    /// Scheduler tick interval in minutes.
    pub interval_minutes: i64,
    /// Whether the scheduler should run this type at all.
    pub enabled: bool,
}

/// A monitored catalog product.
///
/// `old_price` always reflects the price immediately prior to the most
/// recent update; a price decrease is `price < old_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    /// Catalog identifier (upper-case ASIN).
    pub asin: String,
    /// Display title.
    pub title: String,
    /// Canonical product page URL.
    pub url: String,
    /// Main product image, if any.
    pub image_url: Option<String>,
    /// Current price.
    pub price: f64,
    /// Price before the most recent update.
    pub old_price: f64,
    /// List price before any discount.
    pub full_price: f64,
    /// Running minimum price ever observed.
    pub lowest_price: f64,
    /// Whether the item is currently in stock.
    pub in_stock: bool,
    /// Whether the item is a preorder.
    pub preorder: bool,
    /// Best-effort classifier output.
    pub category: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// Last time this product was handed out for a periodic check.
    pub checked_at: String,
}

/// The record of a user watching a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    /// Watched product.
    pub product_asin: String,
    /// Watching user.
    pub user_id: String,
    /// Optional threshold: when set, only notify at or below this price.
    pub desired_price: Option<f64>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A user in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Stable user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Chat delivery identity. Users without one are excluded from chat
    /// notifications.
    pub chat_id: Option<i64>,
    /// Whether monitoring is enabled for this user.
    pub monitoring_enabled: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// A recorded price change for statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PriceStat {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Product the change applies to.
    pub product_asin: String,
    /// Price before the change.
    pub old_price: f64,
    /// Price after the change.
    pub new_price: f64,
    /// Percentage decrease from old to new.
    pub percentage_change: f64,
    /// Creation timestamp.
    pub created_at: String,
}

/// A secondary in-app notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FeedNotification {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Recipient user.
    pub user_id: String,
    /// Product the drop applies to.
    pub product_asin: String,
    /// Price before the drop.
    pub old_price: f64,
    /// Price after the drop.
    pub new_price: f64,
    /// Whether the user has seen this entry.
    pub seen: bool,
    /// Creation timestamp.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_trip() {
        for ty in [
            ActionType::AddProduct,
            ActionType::CheckProduct,
            ActionType::NotifyPrice,
            ActionType::LinkAccounts,
        ] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
            let back: ActionType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ty);
        }
    }
}
