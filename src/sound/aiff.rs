//! AIFF decoder implementation
//!
//! Decodes uncompressed AIFF audio. Supports:
//! - PCM with any bit depth from 1 to 32
//! - Any channel count
//! - IEEE 754 80-bit extended precision sample rates
//! - Caller-driven chunk streaming (see [`super::stream`])
//!
//! AIFF-C (compressed) streams are rejected as not AIFF.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use log::{debug, info, warn};
use parking_lot::Mutex;

use super::chunk::{ChunkHeader, ChunkId, ChunkScanner};
use super::decoder::{DecodeError, DecodeResult, SoundDecoder};
use super::extended::decode_extended;
use super::formats::{decode_frames, AudioInfo, Frame};
use super::stream::{Chunk, SharedScanner};

/// Minimum COMM body: channels(2) + frames(4) + bit depth(2) + rate(10)
pub const AIFF_COMM_SIZE: u32 = 18;
/// SSND header: offset(4) + block size(4)
pub const AIFF_SSND_SIZE: u32 = 8;
const MAX_BIT_DEPTH: u16 = 32;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// FORM header data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContainerHeader {
    id: ChunkId,
    size: u32,
    form_type: ChunkId,
}

/// COMM chunk data
#[derive(Debug, Clone, Copy, PartialEq)]
struct CommonChunk {
    size: u32,
    channels: u16,
    sample_frames: u32,
    sample_size: u16,
    sample_rate: u32,
    sample_rate_exact: f64,
}

/// SSND chunk header
#[derive(Debug, Default, Clone, Copy)]
struct SoundDataHeader {
    offset: u32,
    block_size: u32,
}

/// Text found in NAME, AUTH, "(c) " and ANNO chunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextMetadata {
    pub name: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub annotations: Vec<String>,
}

impl TextMetadata {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.copyright.is_none()
            && self.annotations.is_empty()
    }
}

/// AIFF decoder over a forward-only byte source
///
/// One decoder reads one stream, once. Metadata captured before a fatal
/// error stays readable but may be incomplete.
pub struct AiffDecoder<R> {
    scanner: SharedScanner<R>,
    /// Present in streaming mode; dropped when parsing ends
    dispatch: Option<Sender<Chunk<R>>>,
    container: Option<ContainerHeader>,
    common: Option<CommonChunk>,
    sound_header: Option<SoundDataHeader>,
    frames: Vec<Frame>,
    truncated: bool,
    text: TextMetadata,
    parsed: bool,
}

impl AiffDecoder<BufReader<File>> {
    /// Open an AIFF file for default decoding
    pub fn open<P: AsRef<Path>>(path: P) -> DecodeResult<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| DecodeError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Self::new(BufReader::new(file), None))
    }

    /// Open an AIFF file in streaming mode
    pub fn open_streaming<P: AsRef<Path>>(
        path: P,
        chunks: Sender<Chunk<BufReader<File>>>,
    ) -> DecodeResult<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| DecodeError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Self::new(BufReader::new(file), Some(chunks)))
    }
}

impl<R: Read> AiffDecoder<R> {
    /// Create a decoder over `source`
    ///
    /// When `chunks` is given the decoder runs in streaming mode: every chunk
    /// after the container header is sent through it instead of being
    /// decoded.
    pub fn new(source: R, chunks: Option<Sender<Chunk<R>>>) -> Self {
        Self {
            scanner: Arc::new(Mutex::new(ChunkScanner::new(source))),
            dispatch: chunks,
            container: None,
            common: None,
            sound_header: None,
            frames: Vec::new(),
            truncated: false,
            text: TextMetadata::default(),
            parsed: false,
        }
    }

    /// Check the FORM header and the AIFF form type
    ///
    /// Must run before any other chunk is read, at most once.
    pub fn validate_container(&mut self) -> DecodeResult<()> {
        if self.container.is_some() {
            return Err(DecodeError::AlreadyParsed);
        }
        let mut scanner = self.scanner.lock();

        let header = scanner
            .next_chunk()?
            .ok_or_else(|| DecodeError::NotAiff("empty stream".to_string()))?;
        if header.id != ChunkId::FORM {
            return Err(DecodeError::NotAiff(format!(
                "expected FORM container, found {}",
                header.id
            )));
        }

        let mut form_type = [0u8; 4];
        scanner.read_body(&mut form_type)?;
        let form_type = ChunkId(form_type);
        if form_type != ChunkId::AIFF {
            return Err(DecodeError::NotAiff(format!(
                "expected AIFF form type, found {}",
                form_type
            )));
        }
        scanner.descend();

        debug!("FORM container, declared size {}", header.size);
        self.container = Some(ContainerHeader {
            id: header.id,
            size: header.size,
            form_type,
        });
        Ok(())
    }

    fn parse_stream(&mut self) -> DecodeResult<()> {
        if self.parsed {
            return Err(DecodeError::AlreadyParsed);
        }
        self.parsed = true;
        if self.container.is_none() {
            self.validate_container()?;
        }

        loop {
            let header = match self.scanner.lock().next_chunk()? {
                Some(header) => header,
                None => break,
            };
            let keep_going = match self.dispatch.clone() {
                Some(tx) => self.dispatch_chunk(header, &tx)?,
                None => self.handle_chunk(header)?,
            };
            if !keep_going {
                break;
            }
        }

        self.check_container_size();
        if self.dispatch.is_none() {
            if let Some(common) = &self.common {
                info!(
                    "decoded AIFF: {} ch, {} bit, {} Hz, {}/{} frames",
                    common.channels,
                    common.sample_size,
                    common.sample_rate,
                    self.frames.len(),
                    common.sample_frames
                );
            }
        }
        Ok(())
    }

    /// Hand one chunk to the streaming consumer and wait for it
    ///
    /// Returns `false` once the consumer has hung up.
    fn dispatch_chunk(&mut self, header: ChunkHeader, tx: &Sender<Chunk<R>>) -> DecodeResult<bool> {
        let (done_tx, done_rx) = channel::bounded(0);
        let token = Chunk::new(header, Arc::clone(&self.scanner), done_tx);
        if tx.send(token).is_err() {
            warn!("chunk consumer hung up before {}; stopping", header.id);
            return Ok(false);
        }
        // Err means the token was dropped without `done`, which completes it too.
        let _ = done_rx.recv();
        self.scanner.lock().finish_chunk()?;
        Ok(true)
    }

    /// Decode a chunk in default mode. Returns `false` at a truncated end.
    fn handle_chunk(&mut self, header: ChunkHeader) -> DecodeResult<bool> {
        match header.id {
            ChunkId::COMM => self.read_common_chunk(header)?,
            ChunkId::SSND => {
                self.read_sound_data(header)?;
                if self.truncated {
                    return Ok(false);
                }
            }
            ChunkId::NAME | ChunkId::AUTH | ChunkId::COPYRIGHT | ChunkId::ANNO => {
                self.read_text_chunk(header)?
            }
            _ => debug!(
                "skipping {} chunk ({} bytes padded)",
                header.id,
                header.padded_size()
            ),
        }
        self.scanner.lock().finish_chunk()?;
        Ok(true)
    }

    fn read_common_chunk(&mut self, header: ChunkHeader) -> DecodeResult<()> {
        if header.size < AIFF_COMM_SIZE {
            return Err(DecodeError::malformed(
                header.id,
                format!("size {} is below the minimum {}", header.size, AIFF_COMM_SIZE),
            ));
        }

        let mut scanner = self.scanner.lock();
        let channels = scanner.read_body_u16()?;
        let sample_frames = scanner.read_body_u32()?;
        let sample_size = scanner.read_body_u16()?;
        let mut rate_bytes = [0u8; 10];
        scanner.read_body(&mut rate_bytes)?;
        drop(scanner);

        let sample_rate_exact = decode_extended(rate_bytes);
        let sample_rate = rate_to_hz(sample_rate_exact)
            .ok_or_else(|| DecodeError::malformed(header.id, format!("invalid sample rate {}", sample_rate_exact)))?;

        if self.common.is_some() {
            warn!("duplicate COMM chunk; later one wins");
        }
        self.common = Some(CommonChunk {
            size: header.size,
            channels,
            sample_frames,
            sample_size,
            sample_rate,
            sample_rate_exact,
        });
        Ok(())
    }

    fn read_sound_data(&mut self, header: ChunkHeader) -> DecodeResult<()> {
        let common = self
            .common
            .ok_or(DecodeError::NotReady("SSND chunk precedes COMM chunk"))?;
        if header.size < AIFF_SSND_SIZE {
            return Err(DecodeError::malformed(
                header.id,
                format!("size {} is below the minimum {}", header.size, AIFF_SSND_SIZE),
            ));
        }
        if common.channels == 0 {
            return Err(DecodeError::malformed(header.id, "zero channels declared in COMM"));
        }
        if common.sample_size == 0 || common.sample_size > MAX_BIT_DEPTH {
            return Err(DecodeError::malformed(
                header.id,
                format!("unsupported bit depth {}", common.sample_size),
            ));
        }

        let mut scanner = self.scanner.lock();
        let sound_header = SoundDataHeader {
            offset: scanner.read_body_u32()?,
            block_size: scanner.read_body_u32()?,
        };
        let offset = u64::from(sound_header.offset);
        if offset > scanner.remaining() {
            return Err(DecodeError::malformed(
                header.id,
                format!("data offset {} exceeds chunk body", sound_header.offset),
            ));
        }
        // A stream that ends inside the offset region holds no frames.
        let offset_skipped = scanner.skip_body_up_to(offset)? == offset;

        let expected = scanner.remaining();
        let data = if offset_skipped {
            scanner.read_body_up_to(expected)?
        } else {
            Vec::new()
        };
        drop(scanner);

        let info = AudioInfo {
            channels: common.channels,
            bit_depth: common.sample_size,
            sample_rate: common.sample_rate,
        };
        let frames = decode_frames(&data, &info, common.sample_frames as usize);

        self.truncated = !offset_skipped || (data.len() as u64) < expected;
        if self.truncated || frames.len() < common.sample_frames as usize {
            warn!(
                "sound data holds {} of {} declared frames",
                frames.len(),
                common.sample_frames
            );
        }
        if self.sound_header.is_some() {
            warn!("duplicate SSND chunk; later one wins");
        }
        self.sound_header = Some(sound_header);
        self.frames = frames;
        Ok(())
    }

    fn read_text_chunk(&mut self, header: ChunkHeader) -> DecodeResult<()> {
        let raw = self.scanner.lock().read_body_to_end()?;
        let text = String::from_utf8_lossy(&raw)
            .trim_end_matches('\0')
            .to_string();

        match header.id {
            ChunkId::NAME => self.text.name = Some(text),
            ChunkId::AUTH => self.text.author = Some(text),
            ChunkId::COPYRIGHT => self.text.copyright = Some(text),
            _ => self.text.annotations.push(text),
        }
        Ok(())
    }

    fn check_container_size(&self) {
        if let Some(container) = &self.container {
            let actual = self.bytes_consumed().saturating_sub(8);
            if actual != u64::from(container.size) && !self.truncated {
                warn!(
                    "FORM declares {} bytes but stream held {}",
                    container.size, actual
                );
            }
        }
    }

    fn common(&self) -> DecodeResult<&CommonChunk> {
        self.common
            .as_ref()
            .ok_or(DecodeError::NotReady("COMM chunk has not been decoded"))
    }

    fn container(&self) -> DecodeResult<&ContainerHeader> {
        self.container
            .as_ref()
            .ok_or(DecodeError::NotReady("container has not been validated"))
    }

    /// Container tag, always `FORM` once validated
    pub fn container_id(&self) -> DecodeResult<ChunkId> {
        Ok(self.container()?.id)
    }

    /// Declared container size (recorded, not enforced)
    pub fn container_size(&self) -> DecodeResult<u32> {
        Ok(self.container()?.size)
    }

    /// Form type, always `AIFF` once validated
    pub fn form_type(&self) -> DecodeResult<ChunkId> {
        Ok(self.container()?.form_type)
    }

    /// Declared COMM body size
    pub fn comm_size(&self) -> DecodeResult<u32> {
        Ok(self.common()?.size)
    }

    pub fn channels(&self) -> DecodeResult<u16> {
        Ok(self.common()?.channels)
    }

    /// Frame count declared in COMM
    pub fn sample_frames(&self) -> DecodeResult<u32> {
        Ok(self.common()?.sample_frames)
    }

    pub fn bit_depth(&self) -> DecodeResult<u16> {
        Ok(self.common()?.sample_size)
    }

    /// Sample rate rounded to whole Hz
    pub fn sample_rate(&self) -> DecodeResult<u32> {
        Ok(self.common()?.sample_rate)
    }

    /// Sample rate exactly as stored
    pub fn sample_rate_exact(&self) -> DecodeResult<f64> {
        Ok(self.common()?.sample_rate_exact)
    }

    /// SSND offset and block size, if a sound chunk was decoded
    pub fn sound_data_layout(&self) -> Option<(u32, u32)> {
        self.sound_header.map(|h| (h.offset, h.block_size))
    }

    /// Frames actually decoded; may be fewer than `sample_frames`
    pub fn decoded_frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True when the source ended inside the sound data
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn decoded_frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn text_metadata(&self) -> &TextMetadata {
        &self.text
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.scanner.lock().bytes_consumed()
    }

    pub fn is_streaming(&self) -> bool {
        self.dispatch.is_some()
    }
}

/// Round a decoded rate to whole Hz, rejecting values no stream can play at
fn rate_to_hz(rate: f64) -> Option<u32> {
    if !rate.is_finite() || rate < 0.0 {
        return None;
    }
    let rounded = rate.round();
    if rounded > f64::from(u32::MAX) {
        return None;
    }
    Some(rounded as u32)
}

impl<R: Read + Send> SoundDecoder for AiffDecoder<R> {
    fn name(&self) -> &'static str {
        "AIFF"
    }

    fn parse(&mut self) -> DecodeResult<()> {
        let result = self.parse_stream();
        // Closing the channel ends the consumer's receive loop.
        self.dispatch = None;
        result
    }

    fn audio_info(&self) -> DecodeResult<AudioInfo> {
        let common = self.common()?;
        Ok(AudioInfo {
            channels: common.channels,
            bit_depth: common.sample_size,
            sample_rate: common.sample_rate,
        })
    }

    fn frames(&mut self) -> DecodeResult<(AudioInfo, &[Frame])> {
        if !self.parsed {
            self.parse()?;
        }
        let info = self.audio_info()?;
        Ok((info, &self.frames))
    }

    fn duration(&self) -> DecodeResult<Duration> {
        let common = self.common()?;
        if common.sample_rate == 0 {
            return Err(DecodeError::DivisionUndefined);
        }
        let nanos =
            u128::from(common.sample_frames) * NANOS_PER_SEC / u128::from(common.sample_rate);
        Ok(Duration::from_nanos(nanos as u64))
    }
}
