/// End-to-end benchmarking of one snippet
/// extract -> render -> run in a sandbox -> classify
use crate::config::loader::BenchboxConfig;
use crate::config::types::{MeasurementOptions, Result, StreamSelection};
use crate::core::backend::SandboxBackend;
use crate::core::docker::DockerBackend;
use crate::core::runner::SandboxRunner;
use crate::extract::source::{strip_line_comments, SourceExtractor, SourceUnit};
use crate::judge::{adapter_for, JudgeAdapter};
use crate::observability::audit::{self, CorrelationIds};
use crate::verdict::classifier::{BenchmarkResult, ResultClassifier};

pub struct Benchmarker<B: SandboxBackend = DockerBackend> {
    adapter: Box<dyn JudgeAdapter>,
    extractor: SourceExtractor,
    measurement: MeasurementOptions,
    capture: StreamSelection,
    classifier: ResultClassifier,
    runner: SandboxRunner<B>,
    strip_comments: bool,
}

impl Benchmarker<DockerBackend> {
    /// Benchmarker backed by the engine configured in `config`
    pub fn from_config(config: &BenchboxConfig) -> Result<Self> {
        let backend = DockerBackend::from_config(&config.sandbox)?;
        Self::new(backend, config)
    }
}

impl<B: SandboxBackend> Benchmarker<B> {
    pub fn new(backend: B, config: &BenchboxConfig) -> Result<Self> {
        config.validate()?;
        let adapter = adapter_for(&config.language)?;
        let extractor = adapter.extractor()?;
        let command = adapter.staged_command(&config.sandbox, &config.markers);
        let runner = SandboxRunner::new(backend, config.sandbox.clone(), command);

        Ok(Self {
            adapter,
            extractor,
            measurement: config.measurement.clone(),
            capture: config.capture,
            classifier: ResultClassifier::new(config.markers.clone()),
            runner,
            strip_comments: false,
        })
    }

    /// Drop `//` comments before extraction
    pub fn with_comment_stripping(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    pub fn language(&self) -> &'static str {
        self.adapter.language()
    }

    pub fn runner(&self) -> &SandboxRunner<B> {
        &self.runner
    }

    /// Split `code` and render its harness without running anything
    pub fn prepare(&self, code: &str) -> Result<(SourceUnit, String)> {
        let unit = if self.strip_comments {
            self.extractor.extract(&strip_line_comments(code))?
        } else {
            self.extractor.extract(code)?
        };
        let harness = self.adapter.render_harness(&unit, &self.measurement);
        Ok((unit, harness))
    }

    /// Measure `code`, keyed by `filename`.
    ///
    /// Compile and execution failures come back as results; only extraction
    /// misses and sandbox infrastructure failures are errors.
    pub fn benchmark(&self, filename: &str, code: &str) -> Result<BenchmarkResult> {
        let (_, harness) = self.prepare(code)?;
        let correlation = CorrelationIds::new().with_filename(filename);

        log::info!("Benchmarking {} ({} bytes of harness)", filename, harness.len());
        let output = self
            .runner
            .run_with_ids(&harness, self.capture, correlation.clone())?;

        let result = self.classifier.classify(filename, code, &harness, &output);
        audit::result_classified(&correlation, result.verdict().to_string());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BenchError, ExtractError};
    use crate::core::framing::Channel;
    use crate::testing::ScriptedBackend;
    use crate::verdict::classifier::{Verdict, RUNTIME_UNKNOWN};

    const SNIPPET: &str = "#include <vector>\nint main() {\n    std::vector<int> v(100);\n    return 0;\n}\n";

    fn benchmarker(backend: ScriptedBackend) -> Benchmarker<ScriptedBackend> {
        Benchmarker::new(backend, &BenchboxConfig::default()).unwrap()
    }

    #[test]
    fn test_prepare_renders_harness() {
        let bench = benchmarker(ScriptedBackend::succeeding("{}"));
        let (unit, harness) = bench.prepare(SNIPPET).unwrap();

        assert_eq!(unit.body, "std::vector<int> v(100);");
        assert!(harness.starts_with("#include \"nanobench.h\""));
        assert!(harness.contains("#include <vector>"));
        assert!(bench.runner().backend().calls().is_empty());
    }

    #[test]
    fn test_benchmark_measured() {
        let bench = benchmarker(ScriptedBackend::succeeding("{\"runtimeAvg\": 0.25}"));
        let result = bench.benchmark("vec.cpp", SNIPPET).unwrap();

        assert_eq!(result.filename, "vec.cpp");
        assert_eq!(result.code, SNIPPET);
        assert_eq!(result.verdict(), Verdict::Measured(0.25));
        assert_eq!(bench.runner().backend().input(), result.harness_code.as_bytes());
    }

    #[test]
    fn test_default_capture_ignores_stdout() {
        let backend = ScriptedBackend::with_frames(&[
            (Channel::Stdout, "Compilation failed"),
            (Channel::Stderr, "{\"runtimeAvg\": 1.0}"),
        ]);
        let result = benchmarker(backend).benchmark("f", SNIPPET).unwrap();

        assert!(result.compiled);
        assert_eq!(result.runtime_avg, 1.0);
    }

    #[test]
    fn test_compile_failure_is_a_result() {
        let bench = benchmarker(ScriptedBackend::succeeding("error: expected ';'\nCompilation failed\n"));
        let result = bench.benchmark("f", SNIPPET).unwrap();

        assert!(!result.compiled);
        assert_eq!(result.runtime_avg, RUNTIME_UNKNOWN);
    }

    #[test]
    fn test_extraction_miss_runs_nothing() {
        let bench = benchmarker(ScriptedBackend::succeeding("{}"));
        let err = bench.benchmark("f", "void f() {}").unwrap_err();

        assert!(matches!(
            err,
            BenchError::Extraction(ExtractError::EntryNotFound { .. })
        ));
        assert!(bench.runner().backend().calls().is_empty());
    }

    #[test]
    fn test_comment_stripping() {
        let code = "int main() {\n    run(); // }\n}\n";
        let bench = benchmarker(ScriptedBackend::succeeding("{}")).with_comment_stripping(true);
        let (unit, _) = bench.prepare(code).unwrap();
        assert_eq!(unit.body, "run();");
    }

    #[test]
    fn test_infrastructure_failure_propagates() {
        let bench = benchmarker(ScriptedBackend::succeeding("{}").fail_create("image missing"));
        assert!(matches!(
            bench.benchmark("f", SNIPPET),
            Err(BenchError::SandboxUnavailable(_))
        ));
    }

    #[test]
    fn test_unknown_language_rejected() {
        let config = BenchboxConfig {
            language: "haskell".to_string(),
            ..BenchboxConfig::default()
        };
        assert!(Benchmarker::new(ScriptedBackend::succeeding("{}"), &config).is_err());
    }

    #[test]
    fn test_capture_without_stderr_rejected() {
        let config = BenchboxConfig {
            capture: StreamSelection {
                stdout: true,
                stderr: false,
            },
            ..BenchboxConfig::default()
        };
        let err = Benchmarker::new(ScriptedBackend::succeeding("Compilation failed\n"), &config)
            .err()
            .unwrap();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
