// AIFF decoding library and the aiffinfo front end

pub mod cli;
pub mod config;
pub mod logging;
pub mod report;
pub mod sound;

pub use cli::Cli;
pub use config::Options;
pub use logging::LogLevel;
pub use sound::{AiffDecoder, AudioInfo, DecodeError, DecodeResult, Frame, SoundDecoder};
