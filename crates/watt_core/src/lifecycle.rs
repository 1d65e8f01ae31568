//! Order lifecycle operations: mode validation, engine dispatch, derived
//! amounts, timestamp stamping.
//!
//! Every mutating operation follows the same two-phase pattern: validate
//! that the order's payment mode permits the operation, then fire the event
//! against that mode's table. On success a new order value is returned with
//! the committed state, refreshed `update_time` and any derived field; on
//! failure the typed error is returned and the input is untouched. Callers
//! and persistence own storage — nothing here aliases or mutates in place.

use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::machine::engine::{self, TransitionError};
use crate::order::{ChargingOrder, OrderEvent, PaymentType};
use crate::strategy::registry::{StrategyRegistry, UnsupportedPaymentType};

// --- Lifecycle error ----------------------------------------------------

/// Rejection from a lifecycle operation. None of these are retried
/// internally and none leave a partial mutation behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The engine rejected the event (no rule, or guard failure).
    Transition(TransitionError),
    /// Operation invoked against an order of the wrong payment mode.
    PaymentTypeMismatch {
        expected: PaymentType,
        actual: PaymentType,
    },
    /// The registry holds no table for the order's payment mode.
    Unsupported(UnsupportedPaymentType),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition(err) => write!(f, "{err}"),
            Self::PaymentTypeMismatch { expected, actual } => write!(
                f,
                "order is {actual:?} mode, cannot perform {expected:?} mode operation"
            ),
            Self::Unsupported(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LifecycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::Unsupported(err) => Some(err),
            Self::PaymentTypeMismatch { .. } => None,
        }
    }
}

impl From<TransitionError> for LifecycleError {
    fn from(err: TransitionError) -> Self {
        Self::Transition(err)
    }
}

impl From<UnsupportedPaymentType> for LifecycleError {
    fn from(err: UnsupportedPaymentType) -> Self {
        Self::Unsupported(err)
    }
}

// --- Lifecycle --------------------------------------------------------------

/// Drives charging orders through their payment-mode state machine.
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    registry: StrategyRegistry,
}

impl OrderLifecycle {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Lifecycle over the standard registry (both built-in strategies).
    pub fn standard() -> Self {
        Self::new(StrategyRegistry::standard())
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// New order in `Created` with zeroed amounts and stamped timestamps.
    pub fn create_order(
        &self,
        user_id: impl Into<String>,
        charging_pile_id: impl Into<String>,
        payment_type: PaymentType,
    ) -> ChargingOrder {
        let order = ChargingOrder::create(user_id, charging_pile_id, payment_type);
        tracing::info!("Created {:?} order: {}", payment_type, order.order_id);
        order
    }

    // --- PrePaid operations ----------------------------------------------

    /// Take the deposit and fire PAY. PrePaid orders only.
    pub fn pay(
        &self,
        order: &ChargingOrder,
        prepaid_amount: Decimal,
    ) -> Result<ChargingOrder, LifecycleError> {
        self.require_payment_type(order, PaymentType::PrePaid)?;

        let mut next = order.clone();
        next.prepaid_amount = Some(prepaid_amount);
        let next = self.commit(next, OrderEvent::Pay)?;

        tracing::info!("Order {} paid with amount: {}", next.order_id, prepaid_amount);
        Ok(next)
    }

    /// Settle the deposit against actual cost and fire SETTLE. PrePaid only.
    ///
    /// The refund is exact decimal subtraction and may be negative when the
    /// deposit underestimated the session cost.
    pub fn settle(&self, order: &ChargingOrder) -> Result<ChargingOrder, LifecycleError> {
        self.require_payment_type(order, PaymentType::PrePaid)?;

        // PAY is the only path to COMPLETED for PrePaid orders, so the
        // deposit is set by the time SETTLE is legal.
        let prepaid = order.prepaid_amount.unwrap_or(Decimal::ZERO);
        let refund = prepaid - order.order_amount;

        let mut next = order.clone();
        next.refund_amount = Some(refund);
        let next = self.commit(next, OrderEvent::Settle)?;

        tracing::info!("Order {} settled. Refund amount: {}", next.order_id, refund);
        Ok(next)
    }

    // --- PostPaid operations ---------------------------------------------

    /// Place the credit hold and fire AUTHORIZE. PostPaid orders only.
    pub fn authorize(&self, order: &ChargingOrder) -> Result<ChargingOrder, LifecycleError> {
        self.require_payment_type(order, PaymentType::PostPaid)?;

        let next = self.commit(order.clone(), OrderEvent::Authorize)?;

        tracing::info!("Order {} authorized", next.order_id);
        Ok(next)
    }

    /// Collect the actual cost and fire DEDUCT. PostPaid orders only.
    pub fn deduct(&self, order: &ChargingOrder) -> Result<ChargingOrder, LifecycleError> {
        self.require_payment_type(order, PaymentType::PostPaid)?;

        let mut next = order.clone();
        next.actual_amount = Some(next.order_amount);
        let next = self.commit(next, OrderEvent::Deduct)?;

        tracing::info!(
            "Order {} deducted. Amount: {:?}",
            next.order_id,
            next.actual_amount
        );
        Ok(next)
    }

    // --- Mode-agnostic operations ----------------------------------------

    /// Fire START_CHARGING against whichever table matches the order's mode.
    pub fn start_charging(&self, order: &ChargingOrder) -> Result<ChargingOrder, LifecycleError> {
        let next = self.commit(order.clone(), OrderEvent::StartCharging)?;

        tracing::info!("Order {} started charging", next.order_id);
        Ok(next)
    }

    /// Record energy delivered and session cost, then fire FINISH_CHARGING.
    pub fn finish_charging(
        &self,
        order: &ChargingOrder,
        charging_amount: Decimal,
        order_amount: Decimal,
    ) -> Result<ChargingOrder, LifecycleError> {
        let mut next = order.clone();
        next.charging_amount = charging_amount;
        next.order_amount = order_amount;
        let next = self.commit(next, OrderEvent::FinishCharging)?;

        tracing::info!(
            "Order {} finished charging. Amount: {} kWh, Cost: {}",
            next.order_id,
            charging_amount,
            order_amount
        );
        Ok(next)
    }

    /// Fire CANCEL_ORDER (legal only from CREATED in both tables).
    pub fn cancel_order(&self, order: &ChargingOrder) -> Result<ChargingOrder, LifecycleError> {
        let next = self.commit(order.clone(), OrderEvent::CancelOrder)?;

        tracing::info!("Order {} cancelled", next.order_id);
        Ok(next)
    }

    // --- Internals ---------------------------------------------------------

    /// Fire `event` for `next` and, on acceptance, commit the new state and
    /// refresh `update_time`. `next` already carries any caller-recorded
    /// amounts; if the engine rejects, it is dropped and the caller's order
    /// stays as it was.
    fn commit(
        &self,
        mut next: ChargingOrder,
        event: OrderEvent,
    ) -> Result<ChargingOrder, LifecycleError> {
        let table = self.registry.table_for(next.payment_type)?;
        let new_state = engine::fire(table, next.state, event, &next)?;

        next.state = new_state;
        next.update_time = Utc::now();
        Ok(next)
    }

    fn require_payment_type(
        &self,
        order: &ChargingOrder,
        expected: PaymentType,
    ) -> Result<(), LifecycleError> {
        if order.payment_type != expected {
            return Err(LifecycleError::PaymentTypeMismatch {
                expected,
                actual: order.payment_type,
            });
        }
        Ok(())
    }
}

impl Default for OrderLifecycle {
    fn default() -> Self {
        Self::standard()
    }
}
