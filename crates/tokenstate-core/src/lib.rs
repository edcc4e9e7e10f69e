//! tokenstate-core — revertable state reducer for ERC-721 Transfer events.
//!
//! Consumes an ordered (and potentially reverted) stream of Transfer events
//! and maintains a derived table of current token ownership.
//!
//! # Architecture
//!
//! ```text
//! RawTransferEvent ─→ TransferEvent (validated at the boundary)
//!                          │
//!                          ├── dependencies()   → [RecordId]  (pure, batchable)
//!                          │        │
//!                          │   EntityStore pre-fetch
//!                          │        │
//!                          └── process_event(state, event) → Mutation
//!                                   │
//!                              EntityStore commit (tagged with EventRef
//!                              for the revert substrate)
//! ```
//!
//! The reducer is logically single-threaded per event stream: dependency
//! resolution may fan out, but `process_event` applications are strictly
//! ordered because each transition depends on the prior Token state.

pub mod deps;
pub mod entity;
pub mod error;
pub mod event;
pub mod processor;
pub mod reducer;
pub mod schema;
pub mod store;

pub use deps::{dependencies, token_record_id};
pub use entity::{EntityKind, Owner, Record, RecordId, Token, TokenContract};
pub use error::ReducerError;
pub use event::{Address, EventRef, RawTransferEvent, TransferEvent, ZERO_ADDRESS};
pub use processor::{BatchDriver, BatchOutcome, TransferProcessor};
pub use reducer::{Mutation, TransferReducer};
pub use schema::{IndexDeclaration, SchemaDeclaration};
pub use store::EntityStore;
