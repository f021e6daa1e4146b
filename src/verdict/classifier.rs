/// Result classification
/// Maps the raw captured output of one sandbox run to a structured result.
/// Pure function over text: compile marker, then execution marker, then the
/// machine-readable timing fragment.
use crate::config::types::{FailureMarkers, SandboxOutput};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for "no measurement available"
pub const RUNTIME_UNKNOWN: f64 = -1.0;

/// Default name of the timing field in the result fragment
pub const DEFAULT_TIMING_FIELD: &str = "runtimeAvg";

/// Outcome of one benchmark attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    /// Key identifying the snippet (a later result with the same key replaces it)
    pub filename: String,
    pub code: String,
    pub harness_code: String,
    /// Captured stderr text
    pub raw_output: String,
    pub compiled: bool,
    pub executed: bool,
    /// Mean seconds per measured call, or [`RUNTIME_UNKNOWN`]
    pub runtime_avg: f64,
}

impl BenchmarkResult {
    pub fn runtime(&self) -> Option<f64> {
        if self.runtime_avg == RUNTIME_UNKNOWN {
            None
        } else {
            Some(self.runtime_avg)
        }
    }

    pub fn verdict(&self) -> Verdict {
        if !self.compiled {
            Verdict::CompileFailed
        } else if !self.executed {
            Verdict::ExecutionFailed
        } else {
            match self.runtime() {
                Some(avg) => Verdict::Measured(avg),
                None => Verdict::Unmeasured,
            }
        }
    }
}

/// Summary view of a [`BenchmarkResult`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    CompileFailed,
    ExecutionFailed,
    /// Ran to completion but produced no usable timing
    Unmeasured,
    Measured(f64),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::CompileFailed => write!(f, "compile failed"),
            Verdict::ExecutionFailed => write!(f, "execution failed"),
            Verdict::Unmeasured => write!(f, "executed, no timing"),
            Verdict::Measured(avg) => write!(f, "measured {:.9}s", avg),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResultClassifier {
    markers: FailureMarkers,
    timing_field: String,
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self::new(FailureMarkers::default())
    }
}

impl ResultClassifier {
    pub fn new(markers: FailureMarkers) -> Self {
        Self {
            markers,
            timing_field: DEFAULT_TIMING_FIELD.to_string(),
        }
    }

    pub fn with_timing_field(mut self, field: impl Into<String>) -> Self {
        self.timing_field = field.into();
        self
    }

    pub fn markers(&self) -> &FailureMarkers {
        &self.markers
    }

    /// Never fails: unparseable output leaves the runtime sentinel in place.
    pub fn classify(
        &self,
        filename: &str,
        code: &str,
        harness_code: &str,
        output: &SandboxOutput,
    ) -> BenchmarkResult {
        let stderr = output.stderr.as_str();
        let mut result = BenchmarkResult {
            filename: filename.to_string(),
            code: code.to_string(),
            harness_code: harness_code.to_string(),
            raw_output: stderr.to_string(),
            compiled: false,
            executed: false,
            runtime_avg: RUNTIME_UNKNOWN,
        };

        if stderr.contains(&self.markers.compile) {
            return result;
        }
        result.compiled = true;

        if stderr.contains(&self.markers.execution) {
            return result;
        }
        result.executed = true;

        match self.parse_runtime(stderr) {
            Some(avg) => result.runtime_avg = avg,
            None => log::debug!("No {} in output of {}", self.timing_field, filename),
        }
        result
    }

    fn parse_runtime(&self, stderr: &str) -> Option<f64> {
        let fragment: serde_json::Value = serde_json::from_str(stderr.trim()).ok()?;
        fragment.get(&self.timing_field)?.as_f64()
    }
}
