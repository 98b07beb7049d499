//! Action processing pipeline for pricewatch.
//!
//! The pipeline is a persisted work-queue of typed [`Action`] rows, a
//! [`ActionScheduler`] that dispatches each enabled action type to its
//! processor on a per-type interval, and one [`ActionProcessor`] per type:
//!
//! - [`AddProductProcessor`] - URL submission → monitored product
//! - [`CheckProductProcessor`] - periodic price refresh and drop detection
//! - [`NotifyPriceProcessor`] - price-drop fan-out to subscribers
//!
//! Delivery is at-least-once over a polling queue: a processor marks an
//! action processed on success or on any permanent failure, and leaves it
//! pending when the failure is transient so the next scheduler tick
//! retries it.
//!
//! [`Action`]: database::models::Action

mod add_product;
mod check_product;
mod error;
mod notify_price;
mod processor;
mod scheduler;

pub use add_product::{AddProductConfig, AddProductProcessor};
pub use check_product::{CheckProductProcessor, MIN_SIGNIFICANT_DROP_PCT};
pub use error::PipelineError;
pub use notify_price::NotifyPriceProcessor;
pub use processor::ActionProcessor;
pub use scheduler::{ActionScheduler, BATCH_LIMIT};
