use crate::config::types::{MeasurementOptions, Result};
use crate::extract::source::{SourceExtractor, SourceUnit};
use crate::harness::render;
use crate::judge::adapter::JudgeAdapter;

/// Prebuilt nanobench object expected in the sandbox working directory
pub const NANOBENCH_OBJECT: &str = "nanobench.o";

const ENTRY_PREAMBLE: &str = "int main";
const INCLUDE_PATTERN: &str = r"#include[^\n]*";
const TRAILING_RETURN: &str = "return 0;";

#[derive(Debug, Clone, Default)]
pub struct CppAdapter;

impl JudgeAdapter for CppAdapter {
    fn language(&self) -> &'static str {
        "cpp"
    }

    fn compile_command(&self) -> Vec<String> {
        [
            "g++",
            "-w",
            "-O3",
            "--std=c++17",
            NANOBENCH_OBJECT,
            "-x",
            "c++",
            "-",
            "-o",
            "a.out",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }

    fn run_command(&self) -> Vec<String> {
        vec!["./a.out".to_string()]
    }

    fn extractor(&self) -> Result<SourceExtractor> {
        Ok(SourceExtractor::new(ENTRY_PREAMBLE, INCLUDE_PATTERN)?.with_trailing_noop(TRAILING_RETURN))
    }

    fn render_harness(&self, unit: &SourceUnit, options: &MeasurementOptions) -> String {
        render(unit, options)
    }
}
