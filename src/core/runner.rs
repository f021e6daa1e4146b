//! Sandbox runner.
//!
//! One call provisions one sandbox: create, attach, start, deliver the
//! harness on stdin, half-close, read the multiplexed stream until the
//! sandbox closes it, then remove the sandbox. Removal happens on every
//! exit path through [`ContainerGuard`].

use crate::config::types::{Result, SandboxConfig, SandboxOutput, StreamSelection};
use crate::core::backend::{ContainerSpec, SandboxBackend, SandboxStream};
use crate::core::docker::DockerBackend;
use crate::core::framing::demux_with_limit;
use crate::core::pipeline::StagedCommand;
use crate::observability::audit::{self, CorrelationIds};
use crate::safety::cleanup::ContainerGuard;
use uuid::Uuid;

pub struct SandboxRunner<B: SandboxBackend = DockerBackend> {
    backend: B,
    config: SandboxConfig,
    command: StagedCommand,
}

impl SandboxRunner<DockerBackend> {
    /// Runner talking to the engine named in `config`
    pub fn docker(config: SandboxConfig, command: StagedCommand) -> Result<Self> {
        let backend = DockerBackend::from_config(&config)?;
        Ok(Self::new(backend, config, command))
    }
}

impl<B: SandboxBackend> SandboxRunner<B> {
    pub fn new(backend: B, config: SandboxConfig, command: StagedCommand) -> Self {
        Self {
            backend,
            config,
            command,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn command(&self) -> &StagedCommand {
        &self.command
    }

    /// Run `harness_code` and capture both channels
    pub fn run(&self, harness_code: &str) -> Result<SandboxOutput> {
        self.run_with(harness_code, StreamSelection::all())
    }

    pub fn run_with(&self, harness_code: &str, selection: StreamSelection) -> Result<SandboxOutput> {
        self.run_with_ids(harness_code, selection, CorrelationIds::new())
    }

    /// Run under caller-supplied correlation ids.
    ///
    /// Only engine failures are returned. Compile and execution failures
    /// are reported through the markers in the captured output.
    pub fn run_with_ids(
        &self,
        harness_code: &str,
        selection: StreamSelection,
        correlation: CorrelationIds,
    ) -> Result<SandboxOutput> {
        let spec = self.container_spec();
        log::debug!("Creating sandbox {} from {}", spec.name, spec.image);

        let id = self.backend.create(&spec)?;
        let correlation = correlation.with_container(id.clone());
        audit::sandbox_created(&correlation, &spec.image);

        let guard = ContainerGuard::new(&self.backend, id, correlation);

        let mut stream = self.backend.attach(guard.id())?;
        self.backend.start(guard.id())?;
        audit::sandbox_started(guard.correlation());

        deliver_input(stream.as_mut(), harness_code, guard.correlation());

        let output = demux_with_limit(&mut stream, selection, self.config.output_limit_bytes);
        audit::stream_closed(
            guard.correlation(),
            output.stdout.len(),
            output.stderr.len(),
        );

        drop(stream);
        drop(guard);
        Ok(output)
    }

    /// Sandbox to create for the next run, under a fresh name
    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            name: format!("{}-{}", self.config.name_prefix, Uuid::new_v4()),
            image: self.config.image.clone(),
            working_dir: self.config.working_dir.clone(),
            command: self.command.argv(),
            network_disabled: self.config.network_disabled,
        }
    }
}

/// Write the whole harness then half-close stdin. Failures are logged only:
/// a sandbox that exits early still has output worth reading.
fn deliver_input(stream: &mut dyn SandboxStream, harness_code: &str, correlation: &CorrelationIds) {
    let written = stream
        .write_all(harness_code.as_bytes())
        .and_then(|_| stream.flush());

    match written {
        Ok(()) => audit::input_delivered(correlation, harness_code.len()),
        Err(e) => {
            log::warn!("Failed to deliver source to sandbox: {}", e);
            audit::input_failed(correlation, e.to_string());
        }
    }

    if let Err(e) = stream.close_write() {
        log::warn!("Failed to close sandbox stdin: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BenchError, FailureMarkers};
    use crate::core::framing::Channel;
    use crate::testing::ScriptedBackend;
    use std::time::Duration;

    fn command() -> StagedCommand {
        StagedCommand {
            compile: vec!["g++".to_string(), "-x".to_string(), "c++".to_string(), "-".to_string()],
            run: vec!["./a.out".to_string()],
            compile_timeout: Duration::from_secs(60),
            execution_timeout: Duration::from_secs(600),
            markers: FailureMarkers::default(),
        }
    }

    fn runner(backend: ScriptedBackend) -> SandboxRunner<ScriptedBackend> {
        SandboxRunner::new(backend, SandboxConfig::default(), command())
    }

    #[test]
    fn test_run_captures_both_channels() {
        let backend = ScriptedBackend::with_frames(&[
            (Channel::Stdout, "hello\n"),
            (Channel::Stderr, "{\"runtimeAvg\": 1.5}"),
        ]);
        let runner = runner(backend);

        let output = runner.run("int main() {}").unwrap();

        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "{\"runtimeAvg\": 1.5}");
    }

    #[test]
    fn test_run_with_selection_drops_stdout() {
        let backend = ScriptedBackend::with_frames(&[
            (Channel::Stdout, "noise"),
            (Channel::Stderr, "Compilation failed\n"),
        ]);
        let runner = runner(backend);

        let output = runner
            .run_with("int main() {", StreamSelection::stderr_only())
            .unwrap();

        assert!(output.stdout.is_empty());
        assert_eq!(output.stderr, "Compilation failed\n");
    }

    #[test]
    fn test_lifecycle_order_and_removal() {
        let runner = runner(ScriptedBackend::succeeding("{}"));

        runner.run("source").unwrap();

        let backend = runner.backend();
        assert_eq!(
            backend.calls(),
            vec!["create", "attach", "start", "close_write", "remove"]
        );
        assert_eq!(backend.input(), b"source".to_vec());
        assert!(backend.input_closed());
        assert_eq!(backend.removed(), vec!["scripted-1".to_string()]);
    }

    #[test]
    fn test_container_spec_from_config() {
        let runner = runner(ScriptedBackend::succeeding("{}"));
        runner.run("x").unwrap();

        let created = runner.backend().created();
        assert_eq!(created.len(), 1);
        let spec = &created[0];
        assert!(spec.name.starts_with("benchbox-"));
        assert_eq!(spec.image, "localhost/benchmark");
        assert_eq!(spec.working_dir, "/usr/src");
        assert_eq!(spec.command[..2], ["sh".to_string(), "-c".to_string()]);
        assert!(spec.network_disabled);
    }

    #[test]
    fn test_names_are_unique_per_run() {
        let runner = runner(ScriptedBackend::succeeding("{}"));
        assert_ne!(runner.container_spec().name, runner.container_spec().name);
    }

    #[test]
    fn test_broken_input_still_reads_output() {
        let backend = ScriptedBackend::succeeding("Compilation failed\n").reject_input();
        let runner = runner(backend);

        let output = runner.run("int main() {}").unwrap();

        assert_eq!(output.stderr, "Compilation failed\n");
        assert!(runner.backend().input().is_empty());
        assert_eq!(runner.backend().removed().len(), 1);
    }

    #[test]
    fn test_create_failure_leaves_nothing_to_remove() {
        let backend = ScriptedBackend::succeeding("{}").fail_create("no such image");
        let runner = runner(backend);

        let err = runner.run("x").unwrap_err();

        assert!(matches!(err, BenchError::SandboxUnavailable(_)));
        assert_eq!(runner.backend().remove_attempts(), 0);
    }

    #[test]
    fn test_attach_failure_removes_sandbox() {
        let runner = runner(ScriptedBackend::succeeding("{}").fail_attach());

        assert!(matches!(runner.run("x"), Err(BenchError::Sandbox(_))));
        assert_eq!(runner.backend().removed(), vec!["scripted-1".to_string()]);
    }

    #[test]
    fn test_start_failure_removes_sandbox() {
        let runner = runner(ScriptedBackend::succeeding("{}").fail_start());

        assert!(runner.run("x").is_err());
        assert_eq!(runner.backend().removed(), vec!["scripted-1".to_string()]);
        assert!(!runner.backend().input_closed());
    }

    #[test]
    fn test_removal_failure_does_not_fail_run() {
        let runner = runner(ScriptedBackend::succeeding("{\"runtimeAvg\": 2}").fail_remove());

        let output = runner.run("x").unwrap();

        assert_eq!(output.stderr, "{\"runtimeAvg\": 2}");
        assert_eq!(runner.backend().remove_attempts(), 1);
    }
}
