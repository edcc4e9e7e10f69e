//! Dependency resolution — which records an event needs before processing.
//!
//! Invoked ahead of processing, potentially for thousands of events at once,
//! purely to compute what to batch pre-fetch. Pure and side-effect-free;
//! every dependency must be computable from the event alone (derived
//! dependencies from previously fetched records are unsupported).

use crate::entity::RecordId;
use crate::event::TransferEvent;

/// The Token record key a Transfer event operates on.
pub fn token_record_id(event: &TransferEvent) -> RecordId {
    RecordId::token(&event.token_contract, &event.token_id)
}

/// All record IDs the reducer will read while processing `event`.
///
/// For a Transfer event this is exactly one ID. Resolving the same event
/// twice yields the identical list.
pub fn dependencies(event: &TransferEvent) -> Vec<RecordId> {
    vec![token_record_id(event)]
}
