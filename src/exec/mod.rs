//! Execution control
//!
//! Ties extraction, harness rendering, the sandbox runner and classification
//! into one benchmarking operation.

pub mod benchmarker;

pub use benchmarker::Benchmarker;
