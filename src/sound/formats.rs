//! Audio format definitions and PCM frame decoding
//!
//! AIFF sound data is interleaved, big-endian, two's-complement PCM. Samples
//! narrower than their byte span are left-justified.

use std::ops::Deref;

use byteorder::{BigEndian, ByteOrder};

/// Decoded audio parameters from the COMM chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioInfo {
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample as declared (1..=32)
    pub bit_depth: u16,
    /// Sample frequency in Hz
    pub sample_rate: u32,
}

impl AudioInfo {
    /// Returns the number of bytes each sample occupies in the file
    pub fn bytes_per_sample(&self) -> usize {
        bytes_per_sample(self.bit_depth)
    }

    /// Returns the number of bytes per interleaved frame
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }
}

/// Returns `ceil(bit_depth / 8)`
pub fn bytes_per_sample(bit_depth: u16) -> usize {
    (usize::from(bit_depth) + 7) / 8
}

/// One sample per channel at a single point in time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame(Vec<i32>);

impl Frame {
    pub fn new(samples: Vec<i32>) -> Self {
        Frame(samples)
    }

    pub fn samples(&self) -> &[i32] {
        &self.0
    }

    pub fn channels(&self) -> usize {
        self.0.len()
    }
}

impl Deref for Frame {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        &self.0
    }
}

impl From<Vec<i32>> for Frame {
    fn from(samples: Vec<i32>) -> Self {
        Frame(samples)
    }
}

/// Decode one big-endian sample spanning `bytes.len()` bytes (1..=4)
///
/// The value is sign-extended from its byte span and then shifted down so a
/// left-justified sample of `bit_depth` bits lands in its natural range.
pub fn decode_sample(bytes: &[u8], bit_depth: u16) -> i32 {
    let width = bytes.len() as u32 * 8;
    let extended = BigEndian::read_int(bytes, bytes.len());
    let unused = width.saturating_sub(u32::from(bit_depth));
    (extended >> unused) as i32
}

/// Decode interleaved PCM into at most `max_frames` frames
///
/// Trailing bytes that do not fill a whole frame are ignored. The caller is
/// responsible for rejecting zero channels or a bit depth outside 1..=32.
pub fn decode_frames(data: &[u8], info: &AudioInfo, max_frames: usize) -> Vec<Frame> {
    let sample_size = info.bytes_per_sample();
    let frame_size = info.frame_size();
    if frame_size == 0 {
        return Vec::new();
    }

    data.chunks_exact(frame_size)
        .take(max_frames)
        .map(|frame| {
            frame
                .chunks_exact(sample_size)
                .map(|sample| decode_sample(sample, info.bit_depth))
                .collect::<Vec<_>>()
                .into()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn info(channels: u16, bit_depth: u16) -> AudioInfo {
        AudioInfo {
            channels,
            bit_depth,
            sample_rate: 44100,
        }
    }

    #[rstest]
    #[case(1, 1)]
    #[case(8, 1)]
    #[case(12, 2)]
    #[case(16, 2)]
    #[case(20, 3)]
    #[case(24, 3)]
    #[case(32, 4)]
    fn test_bytes_per_sample(#[case] bit_depth: u16, #[case] expected: usize) {
        assert_eq!(bytes_per_sample(bit_depth), expected);
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(info(1, 16).frame_size(), 2);
        assert_eq!(info(2, 24).frame_size(), 6);
        assert_eq!(info(6, 32).frame_size(), 24);
        assert!(info(2, 8).is_stereo());
    }

    #[rstest]
    #[case(&[0x7F], 8, 127)]
    #[case(&[0x80], 8, -128)]
    #[case(&[0xFF], 8, -1)]
    #[case(&[0x12, 0x34], 16, 0x1234)]
    #[case(&[0x80, 0x00], 16, -32768)]
    #[case(&[0xFF, 0xFE], 16, -2)]
    #[case(&[0x7F, 0xFF, 0xFF], 24, 8_388_607)]
    #[case(&[0x80, 0x00, 0x00], 24, -8_388_608)]
    #[case(&[0xFF, 0xFF, 0xFF], 24, -1)]
    #[case(&[0x7F, 0xFF, 0xFF, 0xFF], 32, i32::MAX)]
    #[case(&[0x80, 0x00, 0x00, 0x00], 32, i32::MIN)]
    #[case(&[0x7F, 0xF0], 12, 2047)]
    #[case(&[0x80, 0x00], 12, -2048)]
    #[case(&[0xFF, 0xFF, 0xF0], 20, -1)]
    #[case(&[0x80], 1, -1)]
    fn test_decode_sample(#[case] bytes: &[u8], #[case] bit_depth: u16, #[case] expected: i32) {
        assert_eq!(decode_sample(bytes, bit_depth), expected);
    }

    #[test]
    fn test_decode_frames_interleaved_stereo() {
        let data = [0x00, 0x01, 0xFF, 0xFF, 0x00, 0x02, 0xFF, 0xFE];
        let frames = decode_frames(&data, &info(2, 16), usize::MAX);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].samples(), &[1, -1]);
        assert_eq!(frames[1].samples(), &[2, -2]);
    }

    #[test]
    fn test_decode_frames_limits_and_partial_frame() {
        let data = [0u8; 13];
        assert_eq!(decode_frames(&data, &info(1, 16), 100).len(), 6);
        assert_eq!(decode_frames(&data, &info(1, 16), 4).len(), 4);
        assert!(decode_frames(&data, &info(0, 16), 100).is_empty());
    }
}
