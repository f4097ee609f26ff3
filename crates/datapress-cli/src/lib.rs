//! Library components behind the `datapress` binary.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
