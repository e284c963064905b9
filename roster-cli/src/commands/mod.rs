//! Command implementations for the roster CLI

pub mod database;
pub mod migrate;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use migrate::run_migrate;
pub use serve::run_serve;
