//! Processor adapter — exposes the reducer to the host's processor protocol.
//!
//! Two shapes: [`TransferProcessor::apply_one`] (single-event callback form)
//! and [`BatchDriver`] (batch form with dependency pre-fetch). The adapter
//! performs no business logic of its own: it never reorders, filters,
//! deduplicates, or buffers events — ordering and batching policy belong to
//! the host.

use std::collections::{HashMap, HashSet};

use crate::deps::token_record_id;
use crate::entity::{EntityKind, Record, RecordId, Token};
use crate::error::ReducerError;
use crate::event::{EventRef, RawTransferEvent, TransferEvent};
use crate::reducer::{Mutation, TransferReducer};
use crate::schema::SchemaDeclaration;
use crate::store::EntityStore;

/// Host-facing processor: setup + dependencies + process, one instance per
/// worker or batch.
///
/// Hosts may construct as many instances as they like (once per worker, once
/// per batch); instances share nothing.
#[derive(Debug, Default)]
pub struct TransferProcessor {
    reducer: TransferReducer,
}

impl TransferProcessor {
    pub fn new() -> Self {
        Self {
            reducer: TransferReducer::new(),
        }
    }

    /// Declare the ownership-table indexes to the store.
    pub async fn setup<S: EntityStore + ?Sized>(&self, store: &S) -> Result<(), ReducerError> {
        store.setup(&SchemaDeclaration::erc721_ownership()).await
    }

    /// Pre-fetch IDs for one event (pure, safe to call concurrently).
    pub fn dependencies(&self, event: &TransferEvent) -> Vec<RecordId> {
        self.reducer.dependencies(event)
    }

    /// Reduce one event against its pre-fetched state (pure).
    pub fn process_event(
        &self,
        current: Option<&Token>,
        event: &TransferEvent,
    ) -> Option<Mutation> {
        self.reducer.process_event(current, event)
    }

    /// Single-event form: validate, fetch, reduce, commit.
    ///
    /// Returns the committed mutation, `None` for the defined no-op.
    pub async fn apply_one<S: EntityStore + ?Sized>(
        &self,
        store: &S,
        raw: &RawTransferEvent,
    ) -> Result<Option<Mutation>, ReducerError> {
        let event = TransferEvent::from_raw(raw)?;
        let cause = raw.event_ref();
        let id = token_record_id(&event);

        let fetched = store.get(&id).await?;
        let current = as_token(&id, fetched.as_ref())?;

        let mutation = self.process_event(current, &event);
        commit(store, &mutation, &cause).await?;
        Ok(mutation)
    }
}

/// Narrow a fetched record to a Token, surfacing store corruption instead of
/// guessing around it.
fn as_token<'a>(id: &RecordId, record: Option<&'a Record>) -> Result<Option<&'a Token>, ReducerError> {
    match record {
        None => Ok(None),
        Some(record) => record.as_token().map(Some).ok_or_else(|| {
            ReducerError::KindMismatch {
                id: id.to_string(),
                expected: EntityKind::Token,
                actual: record.kind(),
            }
        }),
    }
}

/// Commit a reduced mutation, attributed to its causing event.
async fn commit<S: EntityStore + ?Sized>(
    store: &S,
    mutation: &Option<Mutation>,
    cause: &EventRef,
) -> Result<(), ReducerError> {
    match mutation {
        Some(Mutation::Put(token)) => store.put(Record::Token(token.clone()), cause).await,
        Some(Mutation::Delete(id)) => store.delete(id, cause).await,
        None => Ok(()),
    }
}

// ─── Batch form ──────────────────────────────────────────────────────────────

/// Counters for one processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Events applied (including no-ops).
    pub events_processed: usize,
    /// Token records created.
    pub created: usize,
    /// Token records whose owner was overwritten.
    pub updated: usize,
    /// Token records deleted (burns).
    pub deleted: usize,
    /// Defined no-ops (burns of unknown tokens).
    pub noops: usize,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.events_processed == 0
    }
}

/// Drives a batch of events through pre-fetch and strictly ordered reduction.
///
/// Dependency resolution fans out concurrently (it is pure); the apply phase
/// is strictly serial so each event sees every earlier mutation of the same
/// batch, preserving the per-key state machine.
pub struct BatchDriver<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    processor: TransferProcessor,
}

impl<'a, S: EntityStore + ?Sized> BatchDriver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            processor: TransferProcessor::new(),
        }
    }

    /// Process a batch of raw events, in the order given.
    ///
    /// All events are validated up front, so a malformed event fails the
    /// batch before any mutation is committed.
    pub async fn run(&self, raws: &[RawTransferEvent]) -> Result<BatchOutcome, ReducerError> {
        let mut events = Vec::with_capacity(raws.len());
        for raw in raws {
            events.push((TransferEvent::from_raw(raw)?, raw.event_ref()));
        }

        // Dedup dependency IDs (first occurrence wins); resolving the same
        // ID twice must yield the same pre-fetch outcome anyway.
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for (event, _) in &events {
            for id in self.processor.dependencies(event) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        let fetched =
            futures::future::try_join_all(ids.iter().map(|id| self.store.get(id))).await?;
        let mut snapshot: HashMap<RecordId, Record> = ids
            .into_iter()
            .zip(fetched)
            .filter_map(|(id, record)| record.map(|r| (id, r)))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (event, cause) in &events {
            let id = token_record_id(event);
            let current = as_token(&id, snapshot.get(&id))?;
            let existed = current.is_some();

            let mutation = self.processor.process_event(current, event);
            commit(self.store, &mutation, cause).await?;
            match mutation {
                Some(Mutation::Put(token)) => {
                    if existed {
                        outcome.updated += 1;
                    } else {
                        outcome.created += 1;
                    }
                    snapshot.insert(id, Record::Token(token));
                }
                Some(Mutation::Delete(deleted)) => {
                    snapshot.remove(&deleted);
                    outcome.deleted += 1;
                }
                None => outcome.noops += 1,
            }
            outcome.events_processed += 1;
        }

        tracing::debug!(
            events = outcome.events_processed,
            created = outcome.created,
            updated = outcome.updated,
            deleted = outcome.deleted,
            noops = outcome.noops,
            "batch applied"
        );
        Ok(outcome)
    }
}
