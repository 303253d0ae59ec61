//! Upstream service clients
//!
//! HTTP clients for the gateway's external collaborators. The market
//! data itself comes from CoinGecko; configuration decides between the
//! free and key-authenticated endpoints.

pub mod coingecko;
pub mod config;

pub use coingecko::{CoinGeckoClient, ProviderError};
pub use config::ProviderConfig;
