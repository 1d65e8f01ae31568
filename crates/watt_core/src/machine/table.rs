//! Transition tables: immutable `(from, event) -> (to, guard, action)` rule
//! sets, one table per payment mode.
//!
//! Tables are built once at registry construction and never mutated, so they
//! are safe to share across threads without synchronization. A table holds
//! at most one rule per `(from, event)` pair; the built-in tables are pinned
//! to that invariant by tests.

use crate::order::{ChargingOrder, OrderEvent, OrderState, PaymentType};

// --- Guard and action hooks ----------------------------------------------

/// Precondition evaluated before a transition is accepted. Reads the order,
/// never mutates it.
pub type Guard = fn(&ChargingOrder) -> bool;

/// Side-effecting hook executed exactly once when a transition is accepted.
/// Limited to audit/notification emission; derived-amount arithmetic lives
/// in the lifecycle layer, not here.
pub type Action = fn(OrderState, OrderState, OrderEvent, &ChargingOrder);

// --- Transition rule ------------------------------------------------------

/// One `(from, event) -> (to, guard, action)` rule.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub from: OrderState,
    pub event: OrderEvent,
    pub to: OrderState,
    pub guard: Guard,
    pub action: Action,
}

// --- Transition table -----------------------------------------------------

/// The complete rule set for one payment mode.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    machine_id: &'static str,
    payment_type: PaymentType,
    rules: Vec<TransitionRule>,
}

impl TransitionTable {
    pub fn new(
        machine_id: &'static str,
        payment_type: PaymentType,
        rules: Vec<TransitionRule>,
    ) -> Self {
        Self {
            machine_id,
            payment_type,
            rules,
        }
    }

    pub fn machine_id(&self) -> &'static str {
        self.machine_id
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Look up the rule for `(from, event)`, if one exists.
    pub fn rule_for(&self, from: OrderState, event: OrderEvent) -> Option<&TransitionRule> {
        self.rules
            .iter()
            .find(|rule| rule.from == from && rule.event == event)
    }
}
