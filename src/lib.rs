//! benchbox: sandboxed micro-benchmark execution engine
//! Measures user-supplied code snippets inside disposable containers and
//! reports whether they compiled, ran, and how long they took.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! ## Extraction ([`extract`])
//! - [`extract::block`]: Delimiter-balancing region scanner
//! - [`extract::source`]: Split a snippet into includes, definitions and measured body
//!
//! ## Harness ([`harness`])
//! - [`harness::render`]: nanobench timing harness for one snippet
//! - [`harness::suite`]: Several snippets combined into one program
//!
//! ## Judge adapters ([`judge`])
//! - [`judge::adapter`]: Language contract (extract/render/compile/run)
//! - [`judge::registry`]: Adapter lookup by language name
//!
//! ## Sandbox core ([`core`])
//! - [`core::pipeline`]: Two-stage entry command with failure markers
//! - [`core::framing`]: Multiplexed output stream demultiplexer
//! - [`core::backend`]: Container engine seam
//! - [`core::docker`]: Docker Engine API over a Unix socket
//! - [`core::runner`]: One sandbox per run, removed on every exit path
//!
//! ## Safety & Cleanup ([`safety`])
//! - [`safety::cleanup`]: Scoped sandbox removal guard
//!
//! ## Verdict ([`verdict`])
//! - [`verdict::classifier`]: Raw output to structured result
//!
//! ## Execution ([`exec`])
//! - [`exec::benchmarker`]: extract -> render -> run -> classify
//!
//! ## Observability ([`observability`])
//! - [`observability::audit`]: Structured run lifecycle events
//!
//! ## Configuration ([`config`])
//! - [`config::loader`]: benchbox.json loading and validation
//! - [`config::types`]: Shared types and the error enum
//!
//! ## Testing Infrastructure ([`testing`])
//! - [`testing::scripted`]: In-memory backend replaying canned output

// Text processing
pub mod extract;
pub mod harness;

// Judge adapters (language-specific extract/render/compile/run)
pub mod judge;

// Language-agnostic sandbox runtime core
pub mod core;

// Safety & Cleanup
pub mod safety;

// Result classification
pub mod verdict;

// Execution Control
pub mod exec;

// Observability
pub mod observability;

// Configuration
pub mod config;

// Testing Infrastructure
pub mod testing;

// CLI entrypoint wiring for the benchbox binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::config::loader::BenchboxConfig;
pub use crate::config::types::*;
pub use crate::core::runner::SandboxRunner;
pub use crate::exec::benchmarker::Benchmarker;
pub use crate::verdict::classifier::{BenchmarkResult, Verdict};
