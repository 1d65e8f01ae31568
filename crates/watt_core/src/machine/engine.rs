//! The firing engine: resolve the rule, evaluate its guard, run its action,
//! return the new state.
//!
//! The engine never mutates the order and never persists anything. It
//! returns the target state and leaves commitment to the caller, so a
//! failure later in the caller's pipeline cannot leave a half-applied
//! transition behind. For fixed `(table, current, event, order)` the result
//! is deterministic.

use std::fmt;

use crate::machine::table::TransitionTable;
use crate::order::{ChargingOrder, OrderEvent, OrderState};

// --- Transition error -----------------------------------------------------

/// Rejection from the engine. The order is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// No rule exists for `(state, event)` in the applicable table — a
    /// protocol violation by the caller.
    InvalidTransition {
        state: OrderState,
        event: OrderEvent,
    },
    /// A rule matched but its precondition failed.
    GuardRejected {
        state: OrderState,
        event: OrderEvent,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { state, event } => {
                write!(f, "no transition for event {event:?} in state {state:?}")
            }
            Self::GuardRejected { state, event } => {
                write!(f, "guard rejected event {event:?} in state {state:?}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// --- Firing ----------------------------------------------------------------

/// Fire `event` against `current` using `table`.
///
/// - No matching rule -> `InvalidTransition`.
/// - Guard returns false -> `GuardRejected`.
/// - Otherwise the rule's action runs exactly once and the target state is
///   returned.
pub fn fire(
    table: &TransitionTable,
    current: OrderState,
    event: OrderEvent,
    order: &ChargingOrder,
) -> Result<OrderState, TransitionError> {
    let rule = table
        .rule_for(current, event)
        .ok_or(TransitionError::InvalidTransition {
            state: current,
            event,
        })?;

    if !(rule.guard)(order) {
        return Err(TransitionError::GuardRejected {
            state: current,
            event,
        });
    }

    (rule.action)(rule.from, rule.to, event, order);

    tracing::debug!(
        "State machine [{}] fired event {:?} for order {}: {:?} -> {:?}",
        table.machine_id(),
        event,
        order.order_id,
        current,
        rule.to
    );

    Ok(rule.to)
}
