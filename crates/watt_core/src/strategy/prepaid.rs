//! PrePaid strategy: pay first, charge, settle the difference.
//!
//! Flow: CREATED -PAY-> PAID -START_CHARGING-> CHARGING
//! -FINISH_CHARGING-> COMPLETED -SETTLE-> CLOSED, with
//! CREATED -CANCEL_ORDER-> CANCELLED as the early exit.
//!
//! Guards currently accept unconditionally; they are kept as first-class
//! per-rule functions so business conditions (balance sufficiency, order
//! validity) can be added without touching the engine or the table shape.

use crate::machine::table::{TransitionRule, TransitionTable};
use crate::order::{ChargingOrder, OrderEvent, OrderState, PaymentType};

pub const PREPAID_MACHINE_ID: &str = "CHARGING_PREPAID";

/// Build the PrePaid transition table. Called once at registry construction.
pub fn prepaid_table() -> TransitionTable {
    TransitionTable::new(
        PREPAID_MACHINE_ID,
        PaymentType::PrePaid,
        vec![
            TransitionRule {
                from: OrderState::Created,
                event: OrderEvent::Pay,
                to: OrderState::Paid,
                guard: check_payment_condition,
                action: pay_action,
            },
            TransitionRule {
                from: OrderState::Paid,
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
                event: OrderEvent::Settle,
                to: OrderState::Closed,
                guard: accept,
                action: settle_action,
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

fn check_payment_condition(order: &ChargingOrder) -> bool {
    // Hook for balance-sufficiency and order-validity checks.
    tracing::debug!("Checking payment condition for order: {}", order.order_id);
    true
}

fn accept(_order: &ChargingOrder) -> bool {
    true
}

// --- Actions ----------------------------------------------------------------
//
// Actions are audit hooks only; the deposit is recorded by the caller before
// PAY fires, and the refund is computed by the lifecycle layer, not here.

fn pay_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PrePaid] Order [{}] payment completed: {:?} -> {:?} on event {:?}",
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
        "[PrePaid] Order [{}] charging started: {:?} -> {:?} on event {:?}",
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
        "[PrePaid] Order [{}] charging finished: {:?} -> {:?} on event {:?}. Amount: {} kWh",
        order.order_id,
        from,
        to,
        event,
        order.charging_amount
    );
}

fn settle_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PrePaid] Order [{}] settlement completed: {:?} -> {:?} on event {:?}. Refund: {:?}",
        order.order_id,
        from,
        to,
        event,
        order.refund_amount
    );
}

fn cancel_action(from: OrderState, to: OrderState, event: OrderEvent, order: &ChargingOrder) {
    tracing::info!(
        "[PrePaid] Order [{}] cancelled: {:?} -> {:?} on event {:?}",
        order.order_id,
        from,
        to,
        event
    );
}
