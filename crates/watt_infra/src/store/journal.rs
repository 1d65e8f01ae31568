//! Append-only JSONL journal of committed order transitions.
//!
//! Each accepted transition is persisted first, then applied to the
//! in-memory view; a failed write surfaces as an error and nothing is
//! applied. Records carry a commit sequence number assigned while the store
//! lock is still held, so replay reduces them in commit order even when two
//! appends raced; the per-order latest view tells an operator which orders
//! are still open.
//!
//! Core enums stay serde-free; this module carries its own serializable
//! mirrors plus explicit mapping functions.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use watt_core::order::{ChargingOrder, OrderEvent, OrderState};

// --- Serializable mirrors ------------------------------------------------

/// Wire form of [`OrderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalState {
    Created,
    Paid,
    Authorized,
    Charging,
    Completed,
    Cancelled,
    Closed,
}

impl JournalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JournalState::Closed | JournalState::Cancelled)
    }
}

/// Wire form of [`OrderEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalEventKind {
    Pay,
    Authorize,
    StartCharging,
    FinishCharging,
    Settle,
    Deduct,
    CancelOrder,
}

pub fn map_order_state(state: OrderState) -> JournalState {
    match state {
        OrderState::Created => JournalState::Created,
        OrderState::Paid => JournalState::Paid,
        OrderState::Authorized => JournalState::Authorized,
        OrderState::Charging => JournalState::Charging,
        OrderState::Completed => JournalState::Completed,
        OrderState::Cancelled => JournalState::Cancelled,
        OrderState::Closed => JournalState::Closed,
    }
}

pub fn map_order_event(event: OrderEvent) -> JournalEventKind {
    match event {
        OrderEvent::Pay => JournalEventKind::Pay,
        OrderEvent::Authorize => JournalEventKind::Authorize,
        OrderEvent::StartCharging => JournalEventKind::StartCharging,
        OrderEvent::FinishCharging => JournalEventKind::FinishCharging,
        OrderEvent::Settle => JournalEventKind::Settle,
        OrderEvent::Deduct => JournalEventKind::Deduct,
        OrderEvent::CancelOrder => JournalEventKind::CancelOrder,
    }
}

// --- Transition record ----------------------------------------------------

/// One committed transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub order_id: Uuid,
    /// Commit sequence number. Assigned while the commit's store lock is
    /// still held, so two records for the same order are sequenced even if
    /// their journal appends raced.
    pub seq: u64,
    pub from: JournalState,
    pub to: JournalState,
    pub event: JournalEventKind,
    /// Commit timestamp (ms since epoch).
    pub ts_ms: i64,
}

impl TransitionRecord {
    /// Record for a transition just committed onto `order`.
    pub fn committed(order: &ChargingOrder, from: OrderState, event: OrderEvent, seq: u64) -> Self {
        Self {
            order_id: order.order_id,
            seq,
            from: map_order_state(from),
            to: map_order_state(order.state),
            event: map_order_event(event),
            ts_ms: Utc::now().timestamp_millis(),
        }
    }
}

// --- Journal error ----------------------------------------------------------

/// Error returned when a journal append fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    WriteFailed { reason: String },
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { reason } => write!(f, "journal write failed: {reason}"),
        }
    }
}

impl std::error::Error for JournalError {}

// --- Replay summary ---------------------------------------------------------

/// Outcome of replaying the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Number of transition records replayed.
    pub records_replayed: usize,
    /// Orders whose latest recorded state is non-terminal.
    pub open_order_ids: Vec<Uuid>,
}

// --- Transition journal ------------------------------------------------------

/// Append-only transition journal, optionally backed by a JSONL file. The
/// file handle is opened once and held for the journal's lifetime.
#[derive(Debug)]
pub struct TransitionJournal {
    records: Vec<TransitionRecord>,
    storage_path: Option<PathBuf>,
    storage_file: Option<File>,
}

impl TransitionJournal {
    /// Journal kept only in memory.
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            storage_path: None,
            storage_file: None,
        }
    }

    /// Create/load a journal backed by a JSONL file.
    pub fn with_storage_path(storage_path: impl AsRef<Path>) -> io::Result<Self> {
        let path = storage_path.as_ref().to_path_buf();
        let records = read_records_from_path(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            records,
            storage_path: Some(path),
            storage_file: Some(file),
        })
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    /// The next unused commit sequence number.
    pub fn next_seq(&self) -> u64 {
        self.records.iter().map(|r| r.seq + 1).max().unwrap_or(0)
    }

    /// Append a committed transition: persist first, then apply.
    pub fn append(&mut self, record: TransitionRecord) -> Result<(), JournalError> {
        if let Some(file) = &mut self.storage_file {
            write_record(file, &record).map_err(|reason| JournalError::WriteFailed { reason })?;
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// Reduce the record stream into a latest-state-per-order view and
    /// report which orders are still open. "Latest" means the highest commit
    /// sequence, not append position: appends may land out of order when two
    /// commits raced for the journal lock.
    pub fn replay(&self) -> ReplaySummary {
        let mut latest: Vec<(Uuid, u64, JournalState)> = Vec::new();
        for record in &self.records {
            match latest.iter_mut().find(|(id, _, _)| *id == record.order_id) {
                Some(entry) => {
                    if record.seq >= entry.1 {
                        entry.1 = record.seq;
                        entry.2 = record.to;
                    }
                }
                None => latest.push((record.order_id, record.seq, record.to)),
            }
        }

        let open_order_ids = latest
            .into_iter()
            .filter(|(_, _, state)| !state.is_terminal())
            .map(|(id, _, _)| id)
            .collect();

        ReplaySummary {
            records_replayed: self.records.len(),
            open_order_ids,
        }
    }
}

fn write_record(file: &mut File, record: &TransitionRecord) -> Result<(), String> {
    let line = serde_json::to_string(record)
        .map_err(|e| format!("failed to encode transition record: {e}"))?;
    file.write_all(line.as_bytes())
        .map_err(|e| format!("failed to write transition record: {e}"))?;
    file.write_all(b"\n")
        .map_err(|e| format!("failed to write journal newline: {e}"))?;
    file.flush()
        .map_err(|e| format!("failed to flush journal: {e}"))
}

fn read_records_from_path(path: &Path) -> io::Result<Vec<TransitionRecord>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: TransitionRecord = serde_json::from_str(trimmed).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "invalid transition record at line {} in {}: {e}",
                    index + 1,
                    path.display()
                ),
            )
        })?;
        records.push(record);
    }

    Ok(records)
}
