//! Language-agnostic sandbox core.
//!
//! Core owns the sandbox lifecycle, the engine seam and the output framing.
//! Language-specific compile/run commands come from judge adapters.

pub mod backend;
pub mod docker;
pub mod framing;
pub mod pipeline;
pub mod runner;

pub use backend::{ContainerSpec, SandboxBackend, SandboxStream};
pub use docker::DockerBackend;
pub use framing::{demux, demux_with_limit, encode_frame, Channel, Demuxer};
pub use pipeline::StagedCommand;
pub use runner::SandboxRunner;
