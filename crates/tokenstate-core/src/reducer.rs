//! The Transfer-event reducer — a pure transition function from
//! `(current state, event)` to a mutation.
//!
//! Per Token key the reachable states are `Absent → Owned(a) → Owned(b) →
//! … → Absent`; the four decision rules below are the only transitions.
//! Because reverted events are replayed through the same function, it must
//! never depend on wall-clock time, randomness, or I/O beyond the one
//! pre-fetched record.

use crate::deps::{self, token_record_id};
use crate::entity::{RecordId, Token};
use crate::event::TransferEvent;

/// The store mutation an event reduces to. At most one per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create or fully replace the Token record.
    Put(Token),
    /// Delete the Token record (burn).
    Delete(RecordId),
}

/// Reduces Transfer events against pre-fetched Token state.
///
/// Construct one per worker or batch; instances hold no state between calls,
/// so parallel batches cannot contaminate each other.
#[derive(Debug, Default)]
pub struct TransferReducer;

impl TransferReducer {
    pub fn new() -> Self {
        Self
    }

    /// Record IDs to pre-fetch before processing `event`.
    pub fn dependencies(&self, event: &TransferEvent) -> Vec<RecordId> {
        deps::dependencies(event)
    }

    /// Apply one event to the pre-fetched Token state.
    ///
    /// `current` is the record for the ID returned by [`dependencies`],
    /// or `None` if absent. Returns the mutation to commit, or `None` for
    /// the defined no-op (burn of a token that has no record).
    ///
    /// [`dependencies`]: Self::dependencies
    pub fn process_event(
        &self,
        current: Option<&Token>,
        event: &TransferEvent,
    ) -> Option<Mutation> {
        let id = token_record_id(event);

        let Some(token) = current else {
            if event.to.is_zero() {
                // Burn with nothing to burn — defined no-op, not an error.
                tracing::debug!(id = %id, "burn of unknown token, nothing to do");
                return None;
            }
            tracing::info!(id = %id, owner = %event.to, "new token");
            return Some(Mutation::Put(Token {
                id,
                owner: event.to.clone(),
                token_id: event.token_id.clone(),
                token_contract: event.token_contract.clone(),
            }));
        };

        // `from` is not used for validation (the indexing substrate owns
        // event legitimacy; last event wins) but a mismatch with the
        // recorded owner is worth flagging.
        if token.owner != event.from {
            tracing::warn!(
                id = %id,
                recorded_owner = %token.owner,
                event_from = %event.from,
                "transfer from address that is not the recorded owner"
            );
        }

        if event.to.is_zero() {
            tracing::info!(id = %id, "token burned, deleting record");
            Some(Mutation::Delete(token.id.clone()))
        } else {
            tracing::info!(id = %id, owner = %event.to, "token transferred, new owner");
            Some(Mutation::Put(Token {
                owner: event.to.clone(),
                ..token.clone()
            }))
        }
    }
}
