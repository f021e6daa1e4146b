//! Judge adapters.
//!
//! Core runtime stays language-agnostic. Adapters define how a snippet is
//! split, wrapped in a timing harness, compiled and run for each language.

pub mod adapter;
pub mod languages;
pub mod registry;

pub use adapter::JudgeAdapter;
pub use registry::adapter_for;
