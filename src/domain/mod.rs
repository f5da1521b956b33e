//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod analyzer;
pub mod composite;
pub mod weighting;
pub mod portfolio;
pub mod optimizer;
pub mod stress;
pub mod config;
pub mod error;
