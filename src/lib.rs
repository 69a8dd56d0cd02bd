//! # myaccount
//!
//! Host for the edit-account flow: configuration loading, tracing setup,
//! dependency wiring and a line-oriented console driver.

pub mod bootstrap;
pub mod console;
