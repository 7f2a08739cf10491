//! cambuffer manager library
//!
//! Commands behind the `cambuffer` binary.

pub mod commands;
pub mod config;
