//! Testing infrastructure
//!
//! Engine-free doubles for exercising the runner and the full pipeline.

pub mod scripted;

pub use scripted::ScriptedBackend;
