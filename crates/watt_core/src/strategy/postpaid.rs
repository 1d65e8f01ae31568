//! PostPaid strategy: authorize first, charge, deduct the actual cost.
//!
//! Flow: CREATED -AUTHORIZE-> AUTHORIZED -START_CHARGING-> CHARGING
//! -FINISH_CHARGING-> COMPLETED -DEDUCT-> CLOSED, with
//! CREATED -CANCEL_ORDER-> CANCELLED as the early exit.

use crate::machine::table::{TransitionRule, TransitionTable};
use crate::order::{ChargingOrder, OrderEvent, OrderState, PaymentType};

pub const POSTPAID_MACHINE_ID: &str = "CHARGING_POSTPAID";

/// Build the PostPaid transition table. Called once at registry construction.
pub fn postpaid_table() -> TransitionTable {
    TransitionTable::new(
        POSTPAID_MACHINE_ID,
        PaymentType::PostPaid,
        vec![
            TransitionRule {
                from: OrderState::Created,
                event: OrderEvent::Authorize,
                to: OrderState::Authorized,
                guard: check_authorization_condition,
                action: authorize_action,
            },
            TransitionRule {
                from: OrderState::Authorized,
                event: OrderEvent::StartCharging,
                to: OrderState::Charging,
                guard: accept,
                action: start_charging_action,
            },
            TransitionRule {
                from: OrderState::Charging,
                event: OrderEvent::FinishCharging,
                to: OrderState::Completed,
                guard: accept,
                action: finish_charging_action,
            },
            TransitionRule {
                from: OrderState::Completed,
                event: OrderEvent::Deduct,
                to: OrderState::Closed,
                guard: accept,
                action: deduct_action,
            },
            TransitionRule {
                from: OrderState::Created,
                event: OrderEvent::CancelOrder,
                to: OrderState::Cancelled,
                guard: accept,
                action: cancel_action,
            },
        ],
    )
}

// --- Guards -----------------------------------------------------------------

fn check_authorization_condition(order: &ChargingOrder) -> bool {
    // Hook for credit-score / pay-later-enrollment checks.
    tracing::debug!(
        "Checking authorization condition for order: {}",
        order.order_id
    );
    true
}

fn accept(_order: &ChargingOrder) -> bool {
    true
}

// --- Actions ----------------------------------------------------------------

fn authorize_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PostPaid] Order [{}] authorization completed: {:?} -> {:?} on event {:?}",
        order.order_id,
        from,
        to,
        event
    );
}

fn start_charging_action(
    from: OrderState,
    to: OrderState,
    event: OrderEvent,
    order: &ChargingOrder,
) {
    tracing::info!(
        "[PostPaid] Order [{}] charging started: {:?} -> {:?} on event {:?}",
        order.order_id,
        from,
        to,
        event
    );
}

fn finish_charging_action(
    from: OrderState,
    to: OrderState,
    event: OrderEvent,
    order: &ChargingOrder,
) {
    tracing::info!(
        "[PostPaid] Order [{}] charging finished: {:?} -> {:?} on event {:?}. Amount: {} kWh",
        order.order_id,
        from,
        to,
        event,
        order.charging_amount
    );
}

fn deduct_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PostPaid] Order [{}] deduction completed: {:?} -> {:?} on event {:?}. Amount: {:?}",
        order.order_id,
        from,
        to,
        event,
        order.actual_amount
    );
}

fn cancel_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PostPaid] Order [{}] cancelled: {:?} -> {:?} on event {:?}",
        order.order_id,
        from,
        to,
        event
    );
}
