//! Pipeline error types.

use database::models::ActionType;
use thiserror::Error;
use watch_core::{CatalogError, NotifyError};

/// Errors that can occur while processing actions.
///
/// Every variant here is transient from the queue's point of view: an
/// action that fails with one of these stays pending and is retried on a
/// later scheduler tick. Permanent conditions never surface as errors;
/// they mark the action processed instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Store read/write failure.
    #[error("database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Catalog lookup or URL resolution failure.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Notification delivery failure.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// An action was handed to a processor of the wrong type.
    #[error("action {id} is not a {expected} action")]
    WrongActionType { id: i64, expected: ActionType },
}
