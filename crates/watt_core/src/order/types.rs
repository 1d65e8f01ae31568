//! Closed vocabularies shared by both payment modes.
//!
//! `Paid` is reachable only through the PrePaid table, `Authorized` only
//! through PostPaid; the remaining states are reachable from either mode
//! along disjoint paths.

// --- Payment mode --------------------------------------------------------

/// Which payment protocol governs an order for its entire lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentType {
    /// Pay first, charge, settle the difference as a refund.
    PrePaid,
    /// Authorize first, charge, deduct the actual cost.
    PostPaid,
}

// --- Order state ---------------------------------------------------------

/// Lifecycle states of a charging order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderState {
    Created,
    /// PrePaid only: deposit taken.
    Paid,
    /// PostPaid only: credit hold placed.
    Authorized,
    Charging,
    Completed,
    Cancelled,
    Closed,
}

impl OrderState {
    /// Whether this state is terminal (no transitions are defined out of it).
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderState::Closed | OrderState::Cancelled)
    }
}

// --- Order event ---------------------------------------------------------

/// Events that can drive order transitions. Each payment mode's table uses
/// only the subset relevant to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderEvent {
    /// Take the deposit (PrePaid).
    Pay,
    /// Place the credit hold (PostPaid).
    Authorize,
    StartCharging,
    FinishCharging,
    /// Settle the deposit against actual cost (PrePaid).
    Settle,
    /// Collect the actual cost (PostPaid).
    Deduct,
    CancelOrder,
}
