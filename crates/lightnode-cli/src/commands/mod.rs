//! CLI command handlers

pub mod common;
pub mod config;
pub mod cycle;
pub mod run;
pub mod wallet;
