//! nanobench timing harness.
//!
//! The measured body runs inside `benchmarkFunc()`; the driver renders the
//! result through `output_format` to `std::cerr`, away from anything the
//! snippet itself prints on stdout.

use crate::config::types::MeasurementOptions;
use crate::extract::source::SourceUnit;

/// Render a complete, freestanding C++ translation unit for `unit`.
pub fn render(unit: &SourceUnit, options: &MeasurementOptions) -> String {
    format!(
        r#"#include "nanobench.h"
#include <iostream>
#include <chrono>
{includes}

{additional_defs}

void benchmarkFunc() {{
    {body}
}}

int main() {{
    ankerl::nanobench::Bench benchmark;
    benchmark
    .output(nullptr)
    .epochs({epochs})
    .minEpochIterations({min_epoch_iterations})
    .minEpochTime(std::chrono::duration_cast<std::chrono::nanoseconds>(
        std::chrono::milliseconds({min_epoch_time_ms})
    ));
    benchmark.run("test", []() {{benchmarkFunc();}});
    benchmark.render({output_format}, std::cerr);
}}
"#,
        includes = unit.includes.join("\n"),
        additional_defs = unit.additional_defs,
        body = unit.body,
        epochs = options.epochs,
        min_epoch_iterations = options.min_epoch_iterations,
        min_epoch_time_ms = options.min_epoch_time_ms,
        output_format = cpp_string_literal(&options.output_format),
    )
}

/// Quote `text` as a C++ string literal.
pub fn cpp_string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for ch in text.chars() {
        match ch {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            other => literal.push(other),
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> SourceUnit {
        SourceUnit {
            includes: vec!["#include <vector>".to_string(), "#include <map>".to_string()],
            additional_defs: "static int helper() { return 1; }".to_string(),
            body: "volatile int x = helper();".to_string(),
        }
    }

    #[test]
    fn test_render_embeds_unit() {
        let harness = render(&unit(), &MeasurementOptions::default());

        assert!(harness.starts_with("#include \"nanobench.h\"\n"));
        assert!(harness.contains("#include <vector>\n#include <map>\n"));
        assert!(harness.contains("static int helper() { return 1; }"));
        assert!(harness.contains("void benchmarkFunc() {\n    volatile int x = helper();\n}"));
    }

    #[test]
    fn test_render_measurement_options() {
        let options = MeasurementOptions {
            epochs: 3,
            min_epoch_iterations: 42,
            min_epoch_time_ms: 250,
            ..MeasurementOptions::default()
        };
        let harness = render(&unit(), &options);

        assert!(harness.contains(".epochs(3)"));
        assert!(harness.contains(".minEpochIterations(42)"));
        assert!(harness.contains("std::chrono::milliseconds(250)"));
    }

    #[test]
    fn test_render_output_format_goes_to_stderr() {
        let harness = render(&unit(), &MeasurementOptions::default());
        assert!(harness.contains(
            r#"benchmark.render("{ {{#result}} \"runtimeAvg\": {{average(elapsed)}} {{/result}} }", std::cerr);"#
        ));
    }

    #[test]
    fn test_render_empty_unit() {
        let harness = render(&SourceUnit::default(), &MeasurementOptions::default());
        assert!(harness.contains("void benchmarkFunc() {\n    \n}"));
        assert!(harness.contains("int main() {"));
    }

    #[test]
    fn test_cpp_string_literal() {
        assert_eq!(cpp_string_literal("plain"), "\"plain\"");
        assert_eq!(cpp_string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(cpp_string_literal("c:\\tmp\n"), "\"c:\\\\tmp\\n\"");
    }
}
