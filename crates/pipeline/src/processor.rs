//! The shared processor contract.

use async_trait::async_trait;
use database::models::{Action, ActionType};

use crate::error::PipelineError;

/// A type-specific handler that turns pending actions into state changes
/// and follow-on actions.
///
/// Failure policy, shared by all implementations: a *permanent* condition
/// (invalid input, missing upstream entity, nothing to do) marks the
/// action processed and is never retried; a *transient* condition (catalog
/// exception, store write failure) returns an error and leaves the action
/// pending for the next scheduler tick. Best-effort side channels
/// (classification, price statistics, feed records) never affect the
/// primary outcome.
#[async_trait]
pub trait ActionProcessor: Send + Sync {
    /// The single action type this processor claims.
    fn action_type(&self) -> ActionType;

    /// Consume exactly one action of this processor's type.
    ///
    /// Callers must not invoke this twice for the same action, but
    /// implementations tolerate missing downstream entities gracefully
    /// rather than erroring.
    async fn process(&self, action: &Action) -> Result<(), PipelineError>;

    /// Process up to `limit` units of pending work.
    ///
    /// Returns the number of items handled this tick - a processed count,
    /// not a success count: items resolved as permanent failures are
    /// included, items left pending for retry are not.
    async fn process_next(&self, limit: usize) -> Result<usize, PipelineError>;
}
