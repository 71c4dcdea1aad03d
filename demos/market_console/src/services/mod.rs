// demos/market_console/src/services/mod.rs

pub mod chain_mock;
pub mod file_cart;
pub mod wallet_mock;
