//! tokenstate-storage — pluggable storage backends for TokenState.
//!
//! Backends:
//! - [`memory`] — in-memory revertable store (dev/testing, no persistence)

pub mod memory;

pub use memory::{InMemoryStore, JournalEntry};
