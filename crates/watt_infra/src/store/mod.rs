//! Order persistence collaborators: the bounded in-memory store and the
//! JSONL transition journal.

pub mod journal;
pub mod order_store;

pub use journal::{
    JournalError, JournalEventKind, JournalState, ReplaySummary, TransitionJournal,
    TransitionRecord,
};
pub use order_store::{OrderStore, StoreError, UpdateError};
