#![forbid(unsafe_code)]

pub mod config;
pub mod service;
pub mod store;
