//! Charging order domain model: payment modes, states, events, aggregate.

pub mod model;
pub mod types;

pub use model::ChargingOrder;
pub use types::{OrderEvent, OrderState, PaymentType};
