//! Service configuration with fail-closed resolution.
//!
//! Missing values fall back to documented defaults; present-but-invalid
//! values are rejected with a typed error rather than silently corrected.

use std::fmt;
use std::path::PathBuf;

/// Default bound on the number of orders the in-memory store will hold.
pub const DEFAULT_STORE_CAPACITY: usize = 4096;

/// Knobs for [`ChargingOrderService`](crate::service::ChargingOrderService).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    /// Maximum number of orders held by the store. `None` -> default.
    pub store_capacity: Option<usize>,
    /// JSONL transition-journal path. `None` -> in-memory journal only.
    pub journal_path: Option<PathBuf>,
}

/// Error when a configured value cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidConfigError {
    pub param_name: &'static str,
    pub reason: &'static str,
}

impl fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config fail-closed: '{}' rejected ({})",
            self.param_name, self.reason
        )
    }
}

impl std::error::Error for InvalidConfigError {}

/// Resolve the store capacity.
///
/// - `None` -> [`DEFAULT_STORE_CAPACITY`].
/// - `Some(0)` -> rejected: a zero-capacity store could never hold an order,
///   which is a misconfiguration, not a request for an empty store.
pub fn resolve_store_capacity(value: Option<usize>) -> Result<usize, InvalidConfigError> {
    match value {
        None => Ok(DEFAULT_STORE_CAPACITY),
        Some(0) => Err(InvalidConfigError {
            param_name: "store_capacity",
            reason: "capacity must be at least 1",
        }),
        Some(n) => Ok(n),
    }
}
