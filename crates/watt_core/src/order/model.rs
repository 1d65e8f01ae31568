//! The charging order aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::order::types::{OrderState, PaymentType};

/// One charging session's order.
///
/// `state` is only ever changed by committing an engine-approved transition;
/// the monetary fields specific to one payment mode (`prepaid_amount` /
/// `refund_amount` vs `actual_amount`) are never populated by the other
/// mode's operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingOrder {
    /// Assigned at creation, immutable thereafter.
    pub order_id: Uuid,
    pub user_id: String,
    pub charging_pile_id: String,
    /// Immutable after creation; selects the transition table for the
    /// order's entire lifetime.
    pub payment_type: PaymentType,
    pub state: OrderState,
    /// Energy delivered (kWh). Set once at finish-charging.
    pub charging_amount: Decimal,
    /// Cost of the session. Set once at finish-charging.
    pub order_amount: Decimal,
    /// Deposit taken by the PrePaid pay transition.
    pub prepaid_amount: Option<Decimal>,
    /// Amount collected by the PostPaid deduct transition.
    pub actual_amount: Option<Decimal>,
    /// PrePaid settle result: `prepaid_amount - order_amount`. May be
    /// negative when the deposit underestimated the actual cost; that is a
    /// valid business outcome, not an error.
    pub refund_amount: Option<Decimal>,
    pub create_time: DateTime<Utc>,
    /// Refreshed on every accepted transition.
    pub update_time: DateTime<Utc>,
}

impl ChargingOrder {
    /// New order in `Created` with a fresh id, zeroed amounts and stamped
    /// timestamps.
    pub fn create(
        user_id: impl Into<String>,
        charging_pile_id: impl Into<String>,
        payment_type: PaymentType,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id: Uuid::new_v4(),
            user_id: user_id.into(),
            charging_pile_id: charging_pile_id.into(),
            payment_type,
            state: OrderState::Created,
            charging_amount: Decimal::ZERO,
            order_amount: Decimal::ZERO,
            prepaid_amount: None,
            actual_amount: None,
            refund_amount: None,
            create_time: now,
            update_time: now,
        }
    }
}
