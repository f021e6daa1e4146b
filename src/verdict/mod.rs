//! Result classification
//!
//! Derives benchmark results as pure functions over captured output.

pub mod classifier;

pub use classifier::{BenchmarkResult, ResultClassifier, Verdict, RUNTIME_UNKNOWN};
