//! Gateway tools
//!
//! Pre-built tools backed by the market-data provider. Every tool in
//! the registry has exactly one handler here.

pub mod market;

pub use market::*;
