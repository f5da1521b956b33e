//! signalfolio: technical indicator signals and portfolio optimization.
//!
//! Hexagonal architecture: numerical core in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the command-line harness in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
