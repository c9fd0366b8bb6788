//! Line Framing
//!
//! The log stream arrives as raw bytes framed into newline-terminated
//! lines, each carrying a fixed 8-byte header (the container runtime's
//! stream-type/length prefix) ahead of the actual log text. The decoder
//! here splits on newlines and strips the header, yielding one payload
//! per line.
//!
//! A complete line shorter than the header cannot be deframed; that is a
//! `FramingError` and fatal to the pipeline. Unterminated bytes at end of
//! stream are not a line and are discarded.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::error::IngestError;

/// Fixed per-line stream header width.
pub const HEADER_LEN: usize = 8;

/// Decoder that frames newline-terminated lines and strips the header.
#[derive(Debug, Default)]
pub struct LogLineDecoder {
    _private: (),
}

impl LogLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for LogLineDecoder {
    type Item = Bytes;
    type Error = IngestError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, IngestError> {
        let Some(pos) = src.iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };

        let mut line = src.split_to(pos + 1);
        line.truncate(pos); // drop the newline

        if line.len() < HEADER_LEN {
            return Err(IngestError::Framing { len: line.len() });
        }
        line.advance(HEADER_LEN);
        Ok(Some(line.freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, IngestError> {
        match self.decode(src)? {
            Some(payload) => Ok(Some(payload)),
            None => {
                // A trailing fragment without its newline never became a
                // line; it is dropped, not an error.
                src.clear();
                Ok(None)
            }
        }
    }
}
