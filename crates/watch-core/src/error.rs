//! Error types for collaborator operations.

use thiserror::Error;

/// Errors that can occur during catalog lookups and URL resolution.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure talking to the catalog API.
    #[error("catalog request failed: {0}")]
    Http(String),

    /// The catalog API returned an error status.
    #[error("catalog api error {code}: {message}")]
    Api { code: u16, message: String },

    /// The catalog API returned a body we could not interpret.
    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),

    /// A product URL could not be resolved to its canonical form.
    #[error("url resolution failed: {0}")]
    Resolve(String),
}

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level delivery failure.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The channel rejected the recipient (blocked bot, dead chat, ...).
    #[error("recipient {chat_id} rejected delivery: {message}")]
    Rejected { chat_id: i64, message: String },
}

/// Errors that can occur during best-effort product classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier backend is unreachable or misconfigured.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The classifier returned an unusable answer.
    #[error("classification failed: {0}")]
    Failed(String),
}
