//! Log Sources
//!
//! A [`LogSource`] is the capability the pipeline consumes: given a
//! workload id and stream options, it yields a line-framed byte stream in
//! which every line starts with the fixed 8-byte stream header. The
//! pipeline only ever sees this boundary, so it runs identically against
//! Docker or against a test stream.
//!
//! ## Docker
//! `DockerLogSource` talks to the local Docker daemon. The daemon's
//! multiplexed log protocol frames output with the 8-byte header this
//! crate strips (stream-type byte, three reserved bytes, big endian
//! payload length); the client library demultiplexes that framing away,
//! so the source re-emits wire-form frames before handing bytes to the
//! pipeline. That keeps header stripping, and its error semantics, in one
//! place.
//!
//! A demultiplexed message is not guaranteed to be one line: a single
//! `write()` in the container can carry several newline-terminated lines,
//! and the daemon splits lines longer than its buffer across messages.
//! Re-framing therefore emits one headed frame per complete line and
//! buffers any unterminated tail (per stream) until its newline arrives.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bollard::container::{ListContainersOptions, LogOutput, LogsOptions};
use bollard::Docker;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::{IngestError, Result};
use crate::framing::HEADER_LEN;

/// Line-framed byte stream produced by a source.
pub type LogStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Options for opening a workload's log stream.
#[derive(Debug, Clone)]
pub struct LogStreamOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Ask the runtime to prefix each line with its own timestamp.
    pub timestamps: bool,
    /// Keep the stream open and follow new output.
    pub follow: bool,
    /// Only include output from the last `since_secs` seconds.
    pub since_secs: Option<i64>,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            stderr: true,
            timestamps: true,
            follow: true,
            since_secs: None,
        }
    }
}

/// Capability that opens a workload's combined output as a framed stream.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open(&self, workload_id: &str, options: &LogStreamOptions) -> Result<LogStream>;
}

/// `LogSource` backed by the local Docker daemon.
pub struct DockerLogSource {
    docker: Docker,
}

impl DockerLogSource {
    /// Connect using the daemon's ambient configuration (socket path or
    /// `DOCKER_HOST`).
    pub fn from_env() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| IngestError::Source(format!("docker connect failed: {}", e)))?;
        Ok(Self { docker })
    }

    /// Id of the first running container, for invocations that do not
    /// name a workload explicitly.
    pub async fn first_running_container(&self) -> Result<String> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String>::default()))
            .await
            .map_err(|e| IngestError::Source(format!("container list failed: {}", e)))?;

        containers
            .into_iter()
            .find_map(|c| c.id)
            .ok_or_else(|| IngestError::Source("no running containers".to_string()))
    }
}

#[async_trait]
impl LogSource for DockerLogSource {
    async fn open(&self, workload_id: &str, options: &LogStreamOptions) -> Result<LogStream> {
        let since = options
            .since_secs
            .map(|window| unix_now_secs() - window)
            .unwrap_or(0);

        let logs = self.docker.logs(
            workload_id,
            Some(LogsOptions::<String> {
                follow: options.follow,
                stdout: options.stdout,
                stderr: options.stderr,
                timestamps: options.timestamps,
                since,
                ..Default::default()
            }),
        );

        let mut reframer = LineReframer::default();
        Ok(logs
            .flat_map(move |item| {
                let frames: Vec<std::io::Result<Bytes>> = match item {
                    Ok(output) => {
                        let (stream_type, message) = demux(output);
                        reframer.push(stream_type, &message).into_iter().map(Ok).collect()
                    }
                    Err(e) => vec![Err(std::io::Error::new(std::io::ErrorKind::Other, e))],
                };
                stream::iter(frames)
            })
            .boxed())
    }
}

fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Stream-type byte and payload of a demultiplexed message.
fn demux(output: LogOutput) -> (u8, Bytes) {
    match output {
        LogOutput::StdIn { message } => (0, message),
        LogOutput::StdOut { message } => (1, message),
        LogOutput::StdErr { message } => (2, message),
        LogOutput::Console { message } => (1, message),
    }
}

/// Rebuilds wire-form frames, one per complete line, from demultiplexed
/// messages of arbitrary line alignment.
///
/// A message may hold several lines or only part of one; unterminated
/// bytes are held back, per stream, until their newline arrives. Each
/// emitted frame is `stream-type byte, three reserved bytes, u32
/// big-endian length, line (newline included)`.
#[derive(Debug, Default)]
struct LineReframer {
    // One pending tail per stream type (stdin, stdout, stderr), so
    // interleaved stdout/stderr fragments never mix.
    tails: [BytesMut; 3],
}

impl LineReframer {
    fn push(&mut self, stream_type: u8, message: &[u8]) -> Vec<Bytes> {
        let tail = &mut self.tails[usize::from(stream_type.min(2))];
        tail.extend_from_slice(message);

        let mut frames = Vec::new();
        while let Some(pos) = tail.iter().position(|b| *b == b'\n') {
            let line = tail.split_to(pos + 1);
            frames.push(frame_line(stream_type, &line));
        }
        frames
    }
}

fn frame_line(stream_type: u8, line: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + line.len());
    buf.put_u8(stream_type);
    buf.put_bytes(0, 3);
    buf.put_u32(line.len() as u32);
    buf.put_slice(line);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::LogLineDecoder;
    use tokio_util::codec::Decoder;

    /// Run framed bytes through the pipeline's decoder.
    fn deframe(frames: &[Bytes]) -> Vec<Bytes> {
        let mut decoder = LogLineDecoder::new();
        let mut buf = BytesMut::new();
        for frame in frames {
            buf.extend_from_slice(frame);
        }
        let mut out = Vec::new();
        while let Some(payload) = decoder.decode(&mut buf).unwrap() {
            out.push(payload);
        }
        assert!(buf.is_empty(), "decoder left undecoded bytes");
        out
    }

    #[test]
    fn test_single_line_message_frames_once() {
        let mut reframer = LineReframer::default();
        let frames = reframer.push(1, b"hello\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..HEADER_LEN], &[1, 0, 0, 0, 0, 0, 0, 6]);
        assert_eq!(&frames[0][HEADER_LEN..], b"hello\n");
    }

    #[test]
    fn test_multi_line_message_gets_one_header_per_line() {
        // One container write() carrying two lines; each must reach the
        // decoder behind its own header, including the short second line.
        let mut reframer = LineReframer::default();
        let frames = reframer.push(1, b"a\nb\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(deframe(&frames), vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[test]
    fn test_long_line_split_across_messages_stays_one_line() {
        let mut reframer = LineReframer::default();
        assert!(reframer.push(1, b"the daemon split ").is_empty());
        let frames = reframer.push(1, b"this line\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(
            deframe(&frames),
            vec![Bytes::from("the daemon split this line")]
        );
    }

    #[test]
    fn test_interleaved_streams_do_not_mix_tails() {
        let mut reframer = LineReframer::default();
        assert!(reframer.push(1, b"out...").is_empty());
        let err_frames = reframer.push(2, b"err\n");
        assert_eq!(err_frames.len(), 1);
        assert_eq!(err_frames[0][0], 2);
        assert_eq!(&err_frames[0][HEADER_LEN..], b"err\n");

        let out_frames = reframer.push(1, b"done\n");
        assert_eq!(out_frames.len(), 1);
        assert_eq!(&out_frames[0][HEADER_LEN..], b"out...done\n");
    }

    #[test]
    fn test_unterminated_tail_is_never_emitted() {
        let mut reframer = LineReframer::default();
        assert!(reframer.push(1, b"no newline yet").is_empty());
        assert!(reframer.push(1, b", still none").is_empty());
    }

    #[test]
    fn test_demux_stream_types() {
        let (t, m) = demux(LogOutput::StdOut {
            message: Bytes::from("x"),
        });
        assert_eq!((t, m), (1, Bytes::from("x")));
        let (t, _) = demux(LogOutput::StdErr {
            message: Bytes::from("x"),
        });
        assert_eq!(t, 2);
        let (t, _) = demux(LogOutput::Console {
            message: Bytes::from("x"),
        });
        assert_eq!(t, 1);
    }
}
