//! AIFF sound decoding
//!
//! # Architecture
//!
//! - `cursor` counts and reads big-endian bytes from any `Read` source
//! - `chunk` walks the IFF tag/length/body records and keeps them aligned
//! - `extended` converts the 80-bit float used for sample rates
//! - `formats` holds `AudioInfo` and turns PCM bytes into `Frame`s
//! - `aiff` is the decoder: container validation, COMM and SSND handling
//! - `stream` hands chunks to a caller one at a time over a rendezvous
//! - `SoundDecoder` is the trait the front end drives

pub mod aiff;
pub mod chunk;
pub mod cursor;
pub mod decoder;
pub mod extended;
pub mod formats;
pub mod stream;

pub use aiff::{AiffDecoder, TextMetadata};
pub use chunk::{ChunkHeader, ChunkId, ChunkScanner};
pub use cursor::ByteCursor;
pub use decoder::{DecodeError, DecodeResult, SoundDecoder};
pub use extended::{decode_extended, encode_extended};
pub use formats::{AudioInfo, Frame};
pub use stream::Chunk;
