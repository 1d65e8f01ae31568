//! Generic state machine: transition tables and the firing engine.

pub mod engine;
pub mod table;

pub use engine::{TransitionError, fire};
pub use table::{Action, Guard, TransitionRule, TransitionTable};
