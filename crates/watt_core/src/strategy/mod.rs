//! Per-payment-mode strategies: the two transition tables and the registry
//! that selects between them.

pub mod postpaid;
pub mod prepaid;
pub mod registry;

pub use postpaid::{POSTPAID_MACHINE_ID, postpaid_table};
pub use prepaid::{PREPAID_MACHINE_ID, prepaid_table};
pub use registry::{StrategyRegistry, UnsupportedPaymentType};
