#![forbid(unsafe_code)]

pub mod lifecycle;
pub mod machine;
pub mod order;
pub mod strategy;
