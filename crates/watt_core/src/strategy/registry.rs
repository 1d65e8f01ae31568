//! Strategy registry: payment mode -> transition table.
//!
//! Built eagerly at construction and never mutated afterwards, so it is safe
//! to share across threads for the life of the process. There is no lazy
//! initialization anywhere in this path.

use std::collections::HashMap;
use std::fmt;

use crate::machine::table::TransitionTable;
use crate::order::PaymentType;
use crate::strategy::postpaid::postpaid_table;
use crate::strategy::prepaid::prepaid_table;

// --- Lookup error -----------------------------------------------------------

/// The registry holds no table for the given payment mode.
///
/// With the standard registry this is practically unreachable (the mode enum
/// is closed and both modes are registered), but lookups still surface it as
/// a typed failure rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedPaymentType {
    pub payment_type: PaymentType,
}

impl fmt::Display for UnsupportedPaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported payment type: {:?}", self.payment_type)
    }
}

impl std::error::Error for UnsupportedPaymentType {}

// --- Registry ---------------------------------------------------------------

/// Immutable lookup from payment mode to its transition table.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    tables: HashMap<PaymentType, TransitionTable>,
}

impl StrategyRegistry {
    /// Registry with both built-in strategies (PrePaid and PostPaid).
    pub fn standard() -> Self {
        Self::with_tables(vec![prepaid_table(), postpaid_table()])
    }

    /// Registry over an explicit set of tables, keyed by each table's
    /// payment mode. A later table for the same mode replaces the earlier.
    pub fn with_tables(tables: Vec<TransitionTable>) -> Self {
        let tables = tables
            .into_iter()
            .map(|table| (table.payment_type(), table))
            .collect();
        Self { tables }
    }

    /// The table for `payment_type`, or `UnsupportedPaymentType`.
    pub fn table_for(
        &self,
        payment_type: PaymentType,
    ) -> Result<&TransitionTable, UnsupportedPaymentType> {
        self.tables
            .get(&payment_type)
            .ok_or(UnsupportedPaymentType { payment_type })
    }

    pub fn is_supported(&self, payment_type: PaymentType) -> bool {
        self.tables.contains_key(&payment_type)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
