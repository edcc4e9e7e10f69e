//! In-memory revertable store.
//!
//! Holds the record table in RAM plus a journal of before/after images, one
//! entry per applied mutation, keyed by the causing event. The journal is
//! what makes mutations revertable: a chain reorg undoes exactly the
//! mutations of retracted events, most recent first.
//!
//! Useful for testing and short-lived indexers that don't need persistence;
//! all data is lost when the process exits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use tokenstate_core::entity::{EntityKind, Record, RecordId, Token};
use tokenstate_core::error::ReducerError;
use tokenstate_core::event::{Address, EventRef};
use tokenstate_core::schema::SchemaDeclaration;
use tokenstate_core::store::EntityStore;

/// One applied mutation, with enough state to undo it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// The event that caused this mutation.
    pub cause: EventRef,
    /// Record state before the mutation (`None` = did not exist).
    pub before: Option<Record>,
    /// Record state after the mutation (`None` = deleted).
    pub after: Option<Record>,
    /// When the mutation was applied.
    pub applied_at: DateTime<Utc>,
}

/// In-memory record store with revert bookkeeping.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<RecordId, Record>>,
    journal: Mutex<Vec<JournalEntry>>,
    schema: Mutex<Option<SchemaDeclaration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema declared at setup, if setup has run.
    pub fn declared_schema(&self) -> Option<SchemaDeclaration> {
        self.schema.lock().unwrap().clone()
    }

    /// Look up a Token by key (test/query convenience).
    pub fn get_token(&self, id: &RecordId) -> Option<Token> {
        self.records
            .lock()
            .unwrap()
            .get(id)
            .and_then(|r| r.as_token().cloned())
    }

    /// Total number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Number of journal entries (applied, unreverted mutations).
    pub fn journal_len(&self) -> usize {
        self.journal.lock().unwrap().len()
    }

    /// All Token records currently owned by `owner` — the lookup path backed
    /// by the `(tokenContract, tokenID, owner)` index declaration.
    pub fn tokens_by_owner(&self, owner: &Address) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter_map(|r| r.as_token())
            .filter(|t| &t.owner == owner)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        tokens
    }

    /// All Token records, sorted by key (test/query convenience).
    pub fn all_tokens(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter_map(|r| r.as_token())
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        tokens
    }

    /// Number of records of a given kind (the `kind` index path).
    pub fn count_by_kind(&self, kind: EntityKind) -> usize {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.kind() == kind)
            .count()
    }

    /// Undo every mutation attributed to `event_id`, most recent first.
    ///
    /// Returns the number of mutations reverted. Reverting an event that
    /// caused no mutations is a no-op.
    pub fn revert_event(&self, event_id: &str) -> usize {
        let mut journal = self.journal.lock().unwrap();
        let mut records = self.records.lock().unwrap();

        let mut reverted = 0;
        // Walk backward so overlapping mutations unwind in reverse order.
        let mut i = journal.len();
        while i > 0 {
            i -= 1;
            if journal[i].cause.event_id != event_id {
                continue;
            }
            let entry = journal.remove(i);
            restore(&mut records, entry);
            reverted += 1;
        }
        if reverted > 0 {
            tracing::debug!(event_id, reverted, "reverted event mutations");
        }
        reverted
    }

    /// Undo every mutation caused by an event past `block_number`
    /// (reorg recovery). Mutations at or before the block are kept.
    pub fn rollback_after(&self, block_number: u64) -> usize {
        let mut journal = self.journal.lock().unwrap();
        let mut records = self.records.lock().unwrap();

        let mut reverted = 0;
        let mut i = journal.len();
        while i > 0 {
            i -= 1;
            if journal[i].cause.end_block <= block_number {
                continue;
            }
            let entry = journal.remove(i);
            restore(&mut records, entry);
            reverted += 1;
        }
        if reverted > 0 {
            tracing::debug!(block_number, reverted, "rolled back past block");
        }
        reverted
    }
}

/// Put a record table back to an entry's before-image.
fn restore(records: &mut HashMap<RecordId, Record>, entry: JournalEntry) {
    let id = match (&entry.before, &entry.after) {
        (Some(r), _) | (_, Some(r)) => r.id(),
        (None, None) => return,
    };
    match entry.before {
        Some(record) => {
            records.insert(id, record);
        }
        None => {
            records.remove(&id);
        }
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn setup(&self, schema: &SchemaDeclaration) -> Result<(), ReducerError> {
        if !schema.has_revert_indexes() {
            // Fatal configuration error — the revert substrate cannot
            // attribute mutations without these indexes.
            return Err(ReducerError::MissingIndex {
                fields: vec!["eventID".into(), "endBlock".into()],
            });
        }
        // Re-declaring is allowed; existing records are untouched.
        *self.schema.lock().unwrap() = Some(schema.clone());
        Ok(())
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>, ReducerError> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn put(&self, record: Record, cause: &EventRef) -> Result<(), ReducerError> {
        let id = record.id();
        let before = self.records.lock().unwrap().insert(id, record.clone());
        self.journal.lock().unwrap().push(JournalEntry {
            cause: cause.clone(),
            before,
            after: Some(record),
            applied_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete(&self, id: &RecordId, cause: &EventRef) -> Result<(), ReducerError> {
        let before = self.records.lock().unwrap().remove(id);
        self.journal.lock().unwrap().push(JournalEntry {
            cause: cause.clone(),
            before,
            after: None,
            applied_at: Utc::now(),
        });
        Ok(())
    }
}
