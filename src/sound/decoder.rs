//! Sound decoder trait definition
//!
//! Defines the `SoundDecoder` trait implemented by the AIFF decoder and the
//! `DecodeError` type shared by every layer of the chunk engine.

use std::io;
use std::time::Duration;

use super::chunk::ChunkId;
use super::formats::{AudioInfo, Frame};

/// Error type for decoder operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Container or form tag mismatch
    #[error("Not an AIFF stream: {0}")]
    NotAiff(String),

    /// Source exhausted in the middle of a field
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Declared chunk size inconsistent with the fields it must hold
    #[error("Malformed {id} chunk: {reason}")]
    MalformedChunk { id: ChunkId, reason: String },

    /// Query made before the prerequisite chunk was decoded
    #[error("Not ready: {0}")]
    NotReady(&'static str),

    /// Duration requested for a stream with a zero sample rate
    #[error("Duration undefined for a sample rate of zero")]
    DivisionUndefined,

    /// `parse` invoked a second time on the same decoder
    #[error("Stream already parsed")]
    AlreadyParsed,

    /// Any other failure reported by the byte source
    #[error("I/O error: {0}")]
    Io(String),
}

impl DecodeError {
    /// Create a malformed-chunk error
    pub fn malformed<S: Into<String>>(id: ChunkId, reason: S) -> Self {
        DecodeError::MalformedChunk {
            id,
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEof,
            _ => DecodeError::Io(err.to_string()),
        }
    }
}

/// Result type for decoder operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Sound decoder trait
///
/// A decoder owns exactly one byte source and decodes it exactly once.
/// Metadata queries fail with [`DecodeError::NotReady`] until the chunk that
/// carries them has been decoded.
pub trait SoundDecoder: Send {
    /// Returns the decoder name (e.g., "AIFF")
    fn name(&self) -> &'static str;

    /// Walk the whole stream, decoding the chunks the decoder understands
    fn parse(&mut self) -> DecodeResult<()>;

    /// Channel count, bit depth and sample rate
    fn audio_info(&self) -> DecodeResult<AudioInfo>;

    /// Parse if needed, then return the info together with every decoded frame
    fn frames(&mut self) -> DecodeResult<(AudioInfo, &[Frame])>;

    /// Playback length derived from frame count and sample rate
    fn duration(&self) -> DecodeResult<Duration>;
}
