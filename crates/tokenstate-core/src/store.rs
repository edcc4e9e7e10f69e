//! The persistence seam the reducer writes through.
//!
//! Records are exclusively owned by the store; the reducer never caches them
//! across events. Every mutation carries the causing [`EventRef`] so the
//! revert substrate can undo exactly the mutations of a retracted event.
//! Store failures propagate unchanged — the reducer performs no local retry.

use async_trait::async_trait;

use crate::entity::{Record, RecordId};
use crate::error::ReducerError;
use crate::event::EventRef;
use crate::schema::SchemaDeclaration;

/// A keyed record store with revertable mutations.
///
/// Implemented by `tokenstate-storage` backends; hosts may wrap their own
/// engines.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Declare the required indexes. Called exactly once before processing;
    /// re-declaring the same schema must not corrupt existing data.
    async fn setup(&self, schema: &SchemaDeclaration) -> Result<(), ReducerError>;

    /// Fetch a record by key, `None` if absent.
    async fn get(&self, id: &RecordId) -> Result<Option<Record>, ReducerError>;

    /// Insert or fully replace a record, attributed to `cause`.
    async fn put(&self, record: Record, cause: &EventRef) -> Result<(), ReducerError>;

    /// Delete a record by key, attributed to `cause`.
    async fn delete(&self, id: &RecordId, cause: &EventRef) -> Result<(), ReducerError>;
}
