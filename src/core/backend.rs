//! Container engine seam.
//!
//! The runner drives every sandbox through this trait: create, attach,
//! start, remove. [`crate::core::docker::DockerBackend`] talks to a real
//! engine; [`crate::testing::ScriptedBackend`] replays canned output.

use crate::config::types::Result;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;

/// Everything needed to create one sandbox
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub working_dir: String,
    pub command: Vec<String>,
    pub network_disabled: bool,
}

/// Attached stdin/stdout/stderr connection of a sandbox
pub trait SandboxStream: Read + Write + Send {
    /// Signal end of input without closing the read side
    fn close_write(&mut self) -> std::io::Result<()>;
}

impl SandboxStream for UnixStream {
    fn close_write(&mut self) -> std::io::Result<()> {
        self.shutdown(Shutdown::Write)
    }
}

pub trait SandboxBackend: Send + Sync {
    /// Create a sandbox and return its id. Failure here means no sandbox exists.
    fn create(&self, spec: &ContainerSpec) -> Result<String>;

    fn attach(&self, id: &str) -> Result<Box<dyn SandboxStream>>;

    fn start(&self, id: &str) -> Result<()>;

    /// Remove the sandbox, killing it if still running. Removing a sandbox
    /// that is already gone succeeds.
    fn remove(&self, id: &str) -> Result<()>;

    /// Check the engine is reachable
    fn ping(&self) -> Result<()>;
}
