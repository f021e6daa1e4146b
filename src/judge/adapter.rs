use crate::config::types::{FailureMarkers, MeasurementOptions, Result, SandboxConfig};
use crate::core::pipeline::StagedCommand;
use crate::extract::source::{SourceExtractor, SourceUnit};

/// Judge adapter contract for language-specific extract/render/compile/run stages.
pub trait JudgeAdapter: Send + Sync {
    fn language(&self) -> &'static str;

    /// Compile stage argv; reads the harness from stdin
    fn compile_command(&self) -> Vec<String>;

    fn run_command(&self) -> Vec<String>;

    fn extractor(&self) -> Result<SourceExtractor>;

    fn render_harness(&self, unit: &SourceUnit, options: &MeasurementOptions) -> String;

    /// Sandbox entry command with the configured timeouts
    fn staged_command(&self, config: &SandboxConfig, markers: &FailureMarkers) -> StagedCommand {
        StagedCommand {
            compile: self.compile_command(),
            run: self.run_command(),
            compile_timeout: config.compile_timeout(),
            execution_timeout: config.execution_timeout(),
            markers: markers.clone(),
        }
    }
}
