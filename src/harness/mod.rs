//! Harness generation
//!
//! Timing-harness rendering for a single snippet, plus the combined suite
//! program for several snippets.

pub mod render;
pub mod suite;

pub use render::render;
pub use suite::render_suite;
