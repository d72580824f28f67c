//! Core domain types and logic.

pub mod ohlcv;
pub mod portfolio;
pub mod trade;
pub mod strategy;
pub mod backtest;
pub mod returns;
pub mod align;
pub mod metrics;
pub mod config_validation;
pub mod error;
