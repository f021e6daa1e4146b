//! Combined test program.
//!
//! Several snippets rendered into one standalone program: each unit's helper
//! definitions go into `namespace taskN`, each body into its own `// Task N`
//! block inside a single `main`.

use crate::extract::source::SourceUnit;

/// Render `units` as one program; tasks are numbered from 1 in slice order.
pub fn render_suite(units: &[SourceUnit]) -> String {
    let mut includes: Vec<&str> = Vec::new();
    for include in units.iter().flat_map(|unit| unit.includes.iter()) {
        if !includes.contains(&include.as_str()) {
            includes.push(include);
        }
    }

    let mut namespaces = Vec::new();
    let mut blocks = Vec::new();

    for (index, unit) in units.iter().enumerate() {
        let task = index + 1;
        let has_namespace = !unit.additional_defs.is_empty();

        if has_namespace {
            namespaces.push(format!(
                "namespace task{task} {{\n    {defs}\n}} // namespace task{task}\n",
                task = task,
                defs = unit.additional_defs,
            ));
        }

        let using = if has_namespace {
            format!("using namespace task{};", task)
        } else {
            String::new()
        };
        blocks.push(format!(
            "// Task {task}\n{{\n    {using}\n    {body}\n}}\n",
            task = task,
            using = using,
            body = unit.body,
        ));
    }

    format!(
        "{includes}\n\n{namespaces}\n\nint main () {{\n    {blocks}\n}}\n",
        includes = includes.join("\n"),
        namespaces = namespaces.join("\n"),
        blocks = blocks.join("\n\n"),
    )
}
