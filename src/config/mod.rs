//! Configuration
//!
//! Shared types, error taxonomy, and benchbox.json loading.

pub mod loader;
pub mod types;
