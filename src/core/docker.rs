//! Docker Engine API backend.
//!
//! Engine calls go through `bollard` on a runtime owned by the backend, so
//! the rest of the crate stays blocking. The attached output arrives as
//! decoded chunks; [`AttachedStream`] writes them back out as multiplexed
//! frames so [`crate::core::framing`] applies selection and the output cap
//! exactly as it does for any other backend.

use crate::config::types::{BenchError, Result, SandboxConfig};
use crate::core::backend::{ContainerSpec, SandboxBackend, SandboxStream};
use crate::core::framing::{encode_frame, Channel};
use bollard::container::{
    AttachContainerOptions, Config, CreateContainerOptions, LogOutput, RemoveContainerOptions,
};
use bollard::errors::Error as EngineError;
use bollard::{ClientVersion, Docker};
use futures::{Stream, StreamExt};
use std::future::Future;
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::runtime::Runtime;

/// Per-request timeout handed to the engine client
const ENGINE_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct DockerBackend {
    docker: Docker,
    runtime: Arc<Runtime>,
    socket: PathBuf,
}

impl DockerBackend {
    pub fn new(socket: impl Into<PathBuf>, api_version: &str) -> Result<Self> {
        let socket = socket.into();
        let version = parse_api_version(api_version)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("benchbox-engine")
            .enable_all()
            .build()?;

        let docker = {
            let _entered = runtime.enter();
            Docker::connect_with_unix(&socket.to_string_lossy(), ENGINE_TIMEOUT_SECS, &version)
        }
        .map_err(|e| {
            BenchError::SandboxUnavailable(format!(
                "cannot use container engine at {}: {}",
                socket.display(),
                e
            ))
        })?;

        Ok(Self {
            docker,
            runtime: Arc::new(runtime),
            socket,
        })
    }

    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        Self::new(config.docker_socket.clone(), &config.api_version)
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Whether `image` is present in the engine's local store
    pub fn image_exists(&self, image: &str) -> Result<bool> {
        match self.block_on(self.docker.inspect_image(image)) {
            Ok(_) => Ok(true),
            Err(EngineError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(engine_error("image inspect", e)),
        }
    }
}

impl SandboxBackend for DockerBackend {
    fn create(&self, spec: &ContainerSpec) -> Result<String> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            ..Default::default()
        };
        let config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.working_dir.clone()),
            open_stdin: Some(true),
            stdin_once: Some(true),
            attach_stdin: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            network_disabled: Some(spec.network_disabled),
            ..Default::default()
        };

        log::debug!("Creating container {}", spec.name);
        match self.block_on(self.docker.create_container(Some(options), config)) {
            Ok(created) => Ok(created.id),
            Err(EngineError::DockerResponseServerError {
                status_code: 404,
                message,
            }) => Err(BenchError::SandboxUnavailable(format!(
                "image {} not found: {}",
                spec.image, message
            ))),
            Err(e) => Err(engine_error("create", e)),
        }
    }

    fn attach(&self, id: &str) -> Result<Box<dyn SandboxStream>> {
        let options = AttachContainerOptions::<String> {
            stdin: Some(true),
            stdout: Some(true),
            stderr: Some(true),
            stream: Some(true),
            logs: Some(false),
            ..Default::default()
        };

        log::debug!("Attaching to {}", id);
        let attached = self
            .block_on(self.docker.attach_container(id, Some(options)))
            .map_err(|e| engine_error(&format!("attach to {}", id), e))?;

        Ok(Box::new(AttachedStream {
            runtime: Arc::clone(&self.runtime),
            output: attached.output,
            input: Some(attached.input),
            pending: Vec::new(),
            offset: 0,
        }))
    }

    fn start(&self, id: &str) -> Result<()> {
        match self.block_on(self.docker.start_container::<String>(id, None)) {
            Ok(())
            | Err(EngineError::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(engine_error(&format!("start of {}", id), e)),
        }
    }

    fn remove(&self, id: &str) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };

        match self.block_on(self.docker.remove_container(id, Some(options))) {
            Ok(()) => Ok(()),
            Err(EngineError::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                log::debug!("Container {} already removed", id);
                Ok(())
            }
            Err(e) => Err(engine_error(&format!("removal of {}", id), e)),
        }
    }

    fn ping(&self) -> Result<()> {
        self.block_on(self.docker.ping()).map(|_| ()).map_err(|e| {
            BenchError::SandboxUnavailable(format!(
                "container engine at {} not responding: {}",
                self.socket.display(),
                e
            ))
        })
    }
}

/// Engine status errors are sandbox failures; anything below HTTP means
/// the engine itself could not be used.
fn engine_error(operation: &str, error: EngineError) -> BenchError {
    match error {
        EngineError::DockerResponseServerError {
            status_code,
            message,
        } => BenchError::Sandbox(format!("{} failed ({}): {}", operation, status_code, message)),
        other => BenchError::SandboxUnavailable(format!("{} failed: {}", operation, other)),
    }
}

/// "v1.41" (or "/v1.41/") to the client's version pair
fn parse_api_version(raw: &str) -> Result<ClientVersion> {
    let trimmed = raw.trim_matches('/');
    let digits = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let invalid = || BenchError::Config(format!("invalid engine API version {:?}", raw));
    let (major, minor) = digits.split_once('.').ok_or_else(invalid)?;

    Ok(ClientVersion {
        major_version: major.parse().map_err(|_| invalid())?,
        minor_version: minor.parse().map_err(|_| invalid())?,
    })
}

type OutputStream = Pin<Box<dyn Stream<Item = std::result::Result<LogOutput, EngineError>> + Send>>;

/// Blocking view over an attached container.
///
/// Reads yield the multiplexed byte stream; writes go to the container's
/// stdin until [`SandboxStream::close_write`].
struct AttachedStream {
    runtime: Arc<Runtime>,
    output: OutputStream,
    input: Option<Pin<Box<dyn AsyncWrite + Send>>>,
    pending: Vec<u8>,
    offset: usize,
}

impl AttachedStream {
    fn refill(&mut self, channel: Channel, message: &[u8]) -> io::Result<()> {
        self.pending = encode_frame(channel, message)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        self.offset = 0;
        Ok(())
    }
}

impl Read for AttachedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset == self.pending.len() {
            match self.runtime.block_on(self.output.next()) {
                None => return Ok(0),
                Some(Ok(LogOutput::StdOut { message })) => self.refill(Channel::Stdout, &message)?,
                Some(Ok(LogOutput::StdErr { message })) => self.refill(Channel::Stderr, &message)?,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(io::Error::new(ErrorKind::Other, e)),
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

impl Write for AttachedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::BrokenPipe, "sandbox stdin already closed"))?;
        self.runtime.block_on(input.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.input.as_mut() {
            Some(input) => self.runtime.block_on(input.flush()),
            None => Ok(()),
        }
    }
}

impl SandboxStream for AttachedStream {
    fn close_write(&mut self) -> io::Result<()> {
        match self.input.take() {
            Some(mut input) => self.runtime.block_on(input.shutdown()),
            None => Ok(()),
        }
    }
}
