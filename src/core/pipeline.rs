//! Sandbox entry command.
//!
//! Two bounded stages run by `sh -c`: compile the source arriving on stdin,
//! then execute the artifact. A failing stage writes its marker to stderr
//! and stops the pipeline. Timeouts are enforced inside the sandbox by
//! `timeout(1)`.

use crate::config::types::FailureMarkers;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedCommand {
    pub compile: Vec<String>,
    pub run: Vec<String>,
    pub compile_timeout: Duration,
    pub execution_timeout: Duration,
    pub markers: FailureMarkers,
}

impl StagedCommand {
    /// Shell script for both stages
    pub fn script(&self) -> String {
        [
            format!(
                "timeout {} {}",
                self.compile_timeout.as_secs(),
                shell_join(&self.compile)
            ),
            "exitCode=$?".to_string(),
            "if [ $exitCode -ne 0 ]".to_string(),
            format!(
                "then echo {} 1>&2; exit 1",
                shell_quote(&self.markers.compile)
            ),
            "fi".to_string(),
            format!(
                "timeout {} {}",
                self.execution_timeout.as_secs(),
                shell_join(&self.run)
            ),
            "exitCode=$?".to_string(),
            "if [ $exitCode -ne 0 ]".to_string(),
            format!(
                "then echo {} 1>&2; exit 1",
                shell_quote(&self.markers.execution)
            ),
            "fi".to_string(),
        ]
        .join("; ")
    }

    /// Entry command argv for the sandbox
    pub fn argv(&self) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), self.script()]
    }
}

fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single-quote `word` unless it only holds shell-safe characters.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
