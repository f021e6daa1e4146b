/// Configuration loading from benchbox.json
use crate::config::types::{
    BenchError, FailureMarkers, MeasurementOptions, Result, SandboxConfig, StreamSelection,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "benchbox.json";

/// Full benchbox.json structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchboxConfig {
    /// Language adapter name (see `judge::registry::adapter_for`)
    pub language: String,
    pub sandbox: SandboxConfig,
    pub measurement: MeasurementOptions,
    pub markers: FailureMarkers,
    /// Channels kept from the sandbox output
    pub capture: StreamSelection,
}

impl BenchboxConfig {
    /// Parse configuration from a JSON string; missing fields take defaults
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: BenchboxConfig = serde_json::from_str(content)
            .map_err(|e| BenchError::Config(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BenchError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Load default configuration from ./benchbox.json
    pub fn load_default() -> Result<Self> {
        let config_path = std::env::current_dir()
            .map_err(|e| BenchError::Config(format!("Failed to get current directory: {}", e)))?
            .join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(BenchError::Config(format!(
                "{} not found in current directory",
                CONFIG_FILE_NAME
            )));
        }

        Self::load_from_file(config_path)
    }

    /// Reject configurations that could never produce a measurement
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(BenchError::Config("language must not be empty".to_string()));
        }
        if self.sandbox.image.trim().is_empty() {
            return Err(BenchError::Config("sandbox.image must not be empty".to_string()));
        }
        if self.sandbox.compile_timeout_secs == 0 || self.sandbox.execution_timeout_secs == 0 {
            return Err(BenchError::Config(
                "sandbox timeouts must be greater than zero".to_string(),
            ));
        }
        if self.sandbox.output_limit_bytes == 0 {
            return Err(BenchError::Config(
                "sandbox.output_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.measurement.epochs == 0 {
            return Err(BenchError::Config(
                "measurement.epochs must be greater than zero".to_string(),
            ));
        }
        if self.markers.compile.is_empty() || self.markers.execution.is_empty() {
            return Err(BenchError::Config("failure markers must not be empty".to_string()));
        }
        // Failure markers are printed on stderr.
        if !self.capture.stderr {
            return Err(BenchError::Config(
                "capture.stderr must be enabled: failure markers are read from stderr".to_string(),
            ));
        }
        // One marker inside the other would make the classifier ambiguous.
        if self.markers.compile.contains(&self.markers.execution)
            || self.markers.execution.contains(&self.markers.compile)
        {
            return Err(BenchError::Config(
                "compile and execution markers must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BenchboxConfig {
    fn default() -> Self {
        Self {
            language: "cpp".to_string(),
            sandbox: SandboxConfig::default(),
            measurement: MeasurementOptions::default(),
            markers: FailureMarkers::default(),
            capture: StreamSelection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = BenchboxConfig::from_json_str(
            r#"{ "sandbox": { "image": "registry.local/bench:gcc13" }, "measurement": { "epochs": 3 } }"#,
        )
        .unwrap();

        assert_eq!(config.language, "cpp");
        assert_eq!(config.sandbox.image, "registry.local/bench:gcc13");
        assert_eq!(config.sandbox.working_dir, "/usr/src");
        assert_eq!(config.sandbox.compile_timeout_secs, 60);
        assert_eq!(config.measurement.epochs, 3);
        assert_eq!(config.measurement.min_epoch_iterations, 10);
        assert_eq!(config.markers, FailureMarkers::default());
        assert_eq!(config.capture, StreamSelection::stderr_only());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let config = BenchboxConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BenchboxConfig::default());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = BenchboxConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let err = BenchboxConfig::from_json_str(r#"{ "measurement": { "epochs": 0 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("epochs"));
    }

    #[test]
    fn test_overlapping_markers_rejected() {
        let err = BenchboxConfig::from_json_str(
            r#"{ "markers": { "compile": "failed", "execution": "Execution failed" } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_default_selects_cpp_and_validates() {
        let config = BenchboxConfig::default();
        assert_eq!(config.language, "cpp");
        assert!(config.validate().is_ok());
        assert!(crate::judge::adapter_for(&config.language).is_ok());
    }

    #[test]
    fn test_empty_language_rejected() {
        let err = BenchboxConfig::from_json_str(r#"{ "language": "" }"#).unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_stdout_only_capture_rejected() {
        let err = BenchboxConfig::from_json_str(
            r#"{ "capture": { "stdout": true, "stderr": false } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
        assert!(err.to_string().contains("capture.stderr"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = BenchboxConfig::load_from_file("/nonexistent/benchbox.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/benchbox.json"));
    }
}
