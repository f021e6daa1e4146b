//! Multiplexed stream framing
//!
//! The sandbox's combined output arrives as one byte stream of frames:
//!
//! ```text
//! +------------+--------------+--------------------+-----------------+
//! | channel(1) | reserved (3) | payload len (4 BE) | payload (len)   |
//! +------------+--------------+--------------------+-----------------+
//! ```
//!
//! Channel 1 is stdout, 2 is stderr; any other id is consumed and ignored.
//! A stream that ends inside a header or a payload simply ends: the
//! incomplete frame is dropped and everything before it is kept.

use crate::config::types::{
    BenchError, Result, SandboxOutput, StreamSelection, DEFAULT_OUTPUT_LIMIT_BYTES,
};
use std::io::{ErrorKind, Read};

/// Frame header length in bytes
pub const HEADER_LEN: usize = 8;

const READ_CHUNK: usize = 8 * 1024;

/// Logical output channel carried in a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Channel::Stdout),
            2 => Some(Channel::Stderr),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Channel::Stdout => 1,
            Channel::Stderr => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub channel_id: u8,
    pub payload_len: u32,
}

impl FrameHeader {
    pub fn parse(bytes: [u8; HEADER_LEN]) -> Self {
        Self {
            channel_id: bytes[0],
            payload_len: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        Channel::from_id(self.channel_id)
    }

    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.payload_len as usize
    }
}

/// Encode one frame
pub fn encode_frame(channel: Channel, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        BenchError::Protocol(format!(
            "payload of {} bytes does not fit a frame",
            payload.len()
        ))
    })?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.push(channel.id());
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Incremental demultiplexer.
///
/// Bytes may be pushed in chunks of any size; the per-channel buffers only
/// depend on the concatenation of all chunks.
#[derive(Debug)]
pub struct Demuxer {
    selection: StreamSelection,
    limit: usize,
    pending: Vec<u8>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    frames: usize,
    ignored_frames: usize,
    dropped_bytes: usize,
}

impl Demuxer {
    pub fn new(selection: StreamSelection) -> Self {
        Self {
            selection,
            limit: DEFAULT_OUTPUT_LIMIT_BYTES,
            pending: Vec::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            frames: 0,
            ignored_frames: 0,
            dropped_bytes: 0,
        }
    }

    /// Cap each channel's buffer at `limit` bytes; the excess is discarded
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            let rest = &self.pending[consumed..];
            if rest.len() < HEADER_LEN {
                break;
            }

            let mut header_bytes = [0u8; HEADER_LEN];
            header_bytes.copy_from_slice(&rest[..HEADER_LEN]);
            let header = FrameHeader::parse(header_bytes);
            if rest.len() < header.frame_len() {
                break;
            }

            let payload = &rest[HEADER_LEN..header.frame_len()];
            self.frames += 1;
            match header.channel() {
                Some(Channel::Stdout) if self.selection.stdout => {
                    self.dropped_bytes += append_capped(&mut self.stdout, payload, self.limit);
                }
                Some(Channel::Stderr) if self.selection.stderr => {
                    self.dropped_bytes += append_capped(&mut self.stderr, payload, self.limit);
                }
                Some(_) => {}
                None => self.ignored_frames += 1,
            }

            consumed += header.frame_len();
        }

        self.pending.drain(..consumed);
    }

    /// Number of complete frames seen so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Close the stream: a trailing incomplete frame is dropped.
    pub fn finish(self) -> SandboxOutput {
        if !self.pending.is_empty() {
            log::debug!(
                "Dropping {} bytes of truncated trailing frame",
                self.pending.len()
            );
        }
        if self.ignored_frames > 0 {
            log::debug!("Ignored {} frames on unknown channels", self.ignored_frames);
        }
        if self.dropped_bytes > 0 {
            log::warn!(
                "Sandbox output exceeded {} bytes per channel, discarded {} bytes",
                self.limit,
                self.dropped_bytes
            );
        }

        SandboxOutput {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
        }
    }
}

fn append_capped(buffer: &mut Vec<u8>, payload: &[u8], limit: usize) -> usize {
    let room = limit.saturating_sub(buffer.len());
    let take = room.min(payload.len());
    buffer.extend_from_slice(&payload[..take]);
    payload.len() - take
}

/// Read `reader` until it closes and split it into channels.
pub fn demux<R: Read>(reader: R, selection: StreamSelection) -> SandboxOutput {
    demux_with_limit(reader, selection, DEFAULT_OUTPUT_LIMIT_BYTES)
}

/// [`demux`] with an explicit per-channel cap.
///
/// Read errors end the stream like EOF does.
pub fn demux_with_limit<R: Read>(
    mut reader: R,
    selection: StreamSelection,
    limit: usize,
) -> SandboxOutput {
    let mut demuxer = Demuxer::new(selection).with_limit(limit);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => demuxer.push(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Sandbox stream closed with error: {}", e);
                break;
            }
        }
    }

    demuxer.finish()
}
