/// Core types shared across the benchbox engine
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default per-channel capture cap (8 MiB)
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// Tunable parameters of the timing harness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementOptions {
    /// Number of measurement repetitions
    pub epochs: u32,
    /// Minimum inner-loop repeats per epoch
    pub min_epoch_iterations: u64,
    /// Minimum wall time per epoch before advancing (milliseconds)
    pub min_epoch_time_ms: u64,
    /// Template of the machine-readable result written to stderr at the end of the run
    pub output_format: String,
}

impl Default for MeasurementOptions {
    fn default() -> Self {
        Self {
            epochs: 15,
            min_epoch_iterations: 10,
            min_epoch_time_ms: 100,
            output_format:
                r#"{ {{#result}} "runtimeAvg": {{average(elapsed)}} {{/result}} }"#.to_string(),
        }
    }
}

/// Literal strings the sandbox entry command writes to stderr when a stage fails
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureMarkers {
    pub compile: String,
    pub execution: String,
}

impl Default for FailureMarkers {
    fn default() -> Self {
        Self {
            compile: "Compilation failed".to_string(),
            execution: "Execution failed".to_string(),
        }
    }
}

/// Which sandbox output channels are kept by the demultiplexer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSelection {
    pub stdout: bool,
    pub stderr: bool,
}

impl StreamSelection {
    pub fn all() -> Self {
        Self {
            stdout: true,
            stderr: true,
        }
    }

    pub fn stderr_only() -> Self {
        Self {
            stdout: false,
            stderr: true,
        }
    }
}

impl Default for StreamSelection {
    fn default() -> Self {
        Self::stderr_only()
    }
}

/// Sandbox provisioning settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Base image every sandbox is created from
    pub image: String,
    /// Working directory inside the sandbox
    pub working_dir: String,
    /// Container engine socket
    pub docker_socket: PathBuf,
    /// Engine API version prefix (e.g. "v1.41")
    pub api_version: String,
    pub compile_timeout_secs: u64,
    pub execution_timeout_secs: u64,
    /// Prefix for generated sandbox names
    pub name_prefix: String,
    /// Per-channel capture cap in bytes
    pub output_limit_bytes: usize,
    pub network_disabled: bool,
}

impl SandboxConfig {
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.compile_timeout_secs)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: "localhost/benchmark".to_string(),
            working_dir: "/usr/src".to_string(),
            docker_socket: PathBuf::from("/var/run/docker.sock"),
            api_version: "v1.41".to_string(),
            compile_timeout_secs: 60,
            execution_timeout_secs: 600,
            name_prefix: "benchbox".to_string(),
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            network_disabled: true,
        }
    }
}

/// Demultiplexed sandbox output, decoded lossily
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Why a source text could not be split into a measurable unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("entry preamble {preamble:?} not found")]
    EntryNotFound { preamble: String },

    #[error("entry block starting at byte {start} is never closed")]
    Unterminated { start: usize },
}

/// Error types for the benchbox engine
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// The sandbox could not be provisioned at all (engine unreachable, image missing)
    #[error("Sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    /// The engine rejected a lifecycle call
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
