/// In-memory sandbox backend
/// Replays canned framed output on attach and records every lifecycle call,
/// so runner and pipeline behavior can be checked without a container engine.
use crate::config::types::{BenchError, Result};
use crate::core::backend::{ContainerSpec, SandboxBackend, SandboxStream};
use crate::core::framing::{encode_frame, Channel};
use std::io::{Cursor, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ScriptState {
    calls: Vec<String>,
    created: Vec<ContainerSpec>,
    removed: Vec<String>,
    remove_attempts: usize,
    input: Vec<u8>,
    input_closed: bool,
    next_id: usize,
}

/// Scripted backend; see the module docs
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    output: Vec<u8>,
    fail_create: Option<String>,
    fail_attach: bool,
    fail_start: bool,
    fail_remove: bool,
    reject_input: bool,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedBackend {
    /// Replay `output` (raw framed bytes) to every attached stream
    pub fn new(output: Vec<u8>) -> Self {
        Self {
            output,
            fail_create: None,
            fail_attach: false,
            fail_start: false,
            fail_remove: false,
            reject_input: false,
            state: Arc::new(Mutex::new(ScriptState::default())),
        }
    }

    /// Replay one frame per `(channel, payload)` pair
    pub fn with_frames(frames: &[(Channel, &str)]) -> Self {
        let output = frames
            .iter()
            .flat_map(|(channel, payload)| {
                encode_frame(*channel, payload.as_bytes()).unwrap_or_default()
            })
            .collect();
        Self::new(output)
    }

    /// A sandbox whose run writes `stderr` and nothing else
    pub fn succeeding(stderr: &str) -> Self {
        Self::with_frames(&[(Channel::Stderr, stderr)])
    }

    /// `create` fails as if the base image were missing
    pub fn fail_create(mut self, message: impl Into<String>) -> Self {
        self.fail_create = Some(message.into());
        self
    }

    pub fn fail_attach(mut self) -> Self {
        self.fail_attach = true;
        self
    }

    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn fail_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    /// Writes to the attached stream fail with a broken pipe
    pub fn reject_input(mut self) -> Self {
        self.reject_input = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        lock(&self.state)
    }

    /// Lifecycle calls in order ("create", "attach", "start", "close_write", "remove")
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn created(&self) -> Vec<ContainerSpec> {
        self.state().created.clone()
    }

    /// Ids successfully removed
    pub fn removed(&self) -> Vec<String> {
        self.state().removed.clone()
    }

    pub fn remove_attempts(&self) -> usize {
        self.state().remove_attempts
    }

    /// Bytes written to the sandbox's stdin
    pub fn input(&self) -> Vec<u8> {
        self.state().input.clone()
    }

    pub fn input_closed(&self) -> bool {
        self.state().input_closed
    }
}

impl SandboxBackend for ScriptedBackend {
    fn create(&self, spec: &ContainerSpec) -> Result<String> {
        let mut state = self.state();
        state.calls.push("create".to_string());
        if let Some(message) = &self.fail_create {
            return Err(BenchError::SandboxUnavailable(message.clone()));
        }
        state.next_id += 1;
        state.created.push(spec.clone());
        Ok(format!("scripted-{}", state.next_id))
    }

    fn attach(&self, id: &str) -> Result<Box<dyn SandboxStream>> {
        self.state().calls.push("attach".to_string());
        if self.fail_attach {
            return Err(BenchError::Sandbox(format!("attach to {} refused", id)));
        }
        Ok(Box::new(ScriptedStream {
            output: Cursor::new(self.output.clone()),
            state: Arc::clone(&self.state),
            reject_input: self.reject_input,
        }))
    }

    fn start(&self, id: &str) -> Result<()> {
        self.state().calls.push("start".to_string());
        if self.fail_start {
            return Err(BenchError::Sandbox(format!("start of {} refused", id)));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push("remove".to_string());
        state.remove_attempts += 1;
        if self.fail_remove {
            return Err(BenchError::Sandbox(format!("removal of {} refused", id)));
        }
        state.removed.push(id.to_string());
        Ok(())
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}

struct ScriptedStream {
    output: Cursor<Vec<u8>>,
    state: Arc<Mutex<ScriptState>>,
    reject_input: bool,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.output.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.reject_input {
            return Err(std::io::Error::new(ErrorKind::BrokenPipe, "sandbox closed stdin"));
        }
        lock(&self.state).input.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SandboxStream for ScriptedStream {
    fn close_write(&mut self) -> std::io::Result<()> {
        let mut state = lock(&self.state);
        state.calls.push("close_write".to_string());
        state.input_closed = true;
        Ok(())
    }
}

fn lock(state: &Mutex<ScriptState>) -> MutexGuard<'_, ScriptState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
