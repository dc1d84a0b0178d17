//! Shared AIFF fixtures for integration tests
#![allow(dead_code)]

use aiff::sound::encode_extended;

pub const KICK_FRAMES: u32 = 4484;
pub const KICK_RATE: f64 = 22050.0;
pub const KICK_FORM_SIZE: u32 = 9642;
pub const KICK_APPL_SIZE: usize = 620;

/// Build a synthetic AIFF file chunk by chunk
pub struct AiffBuilder {
    chunks: Vec<u8>,
    form_type: [u8; 4],
    form_size: Option<u32>,
}

impl AiffBuilder {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            form_type: *b"AIFF",
            form_size: None,
        }
    }

    pub fn form_type(mut self, ft: &[u8; 4]) -> Self {
        self.form_type = *ft;
        self
    }

    /// Override the declared FORM size
    pub fn form_size(mut self, size: u32) -> Self {
        self.form_size = Some(size);
        self
    }

    pub fn chunk(mut self, id: &[u8; 4], body: &[u8]) -> Self {
        self.chunks.extend_from_slice(id);
        self.chunks.extend_from_slice(&(body.len() as u32).to_be_bytes());
        self.chunks.extend_from_slice(body);
        if body.len() % 2 != 0 {
            self.chunks.push(0);
        }
        self
    }

    pub fn comm(self, channels: u16, frames: u32, bit_depth: u16, rate: f64) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&channels.to_be_bytes());
        body.extend_from_slice(&frames.to_be_bytes());
        body.extend_from_slice(&bit_depth.to_be_bytes());
        body.extend_from_slice(&encode_extended(rate));
        self.chunk(b"COMM", &body)
    }

    pub fn ssnd(self, pcm: &[u8]) -> Self {
        let mut body = vec![0u8; 8];
        body.extend_from_slice(pcm);
        self.chunk(b"SSND", &body)
    }

    pub fn build(self) -> Vec<u8> {
        let size = self
            .form_size
            .unwrap_or(4 + self.chunks.len() as u32);
        let mut file = Vec::new();
        file.extend_from_slice(b"FORM");
        file.extend_from_slice(&size.to_be_bytes());
        file.extend_from_slice(&self.form_type);
        file.extend_from_slice(&self.chunks);
        file
    }
}

/// Deterministic 16-bit sample for frame `i` of the kick fixture
pub fn kick_sample(i: u32) -> i16 {
    let decay = 32767 - (i as i32 * 7).min(32767);
    let phase = ((i as i32 * 911) % 2001) - 1000;
    ((decay * phase) / 1000) as i16
}

pub fn kick_pcm() -> Vec<u8> {
    (0..KICK_FRAMES)
        .flat_map(|i| kick_sample(i).to_be_bytes())
        .collect()
}

/// Mono 16-bit 22050 Hz kick drum with the same chunk layout as the
/// reference recording: COMM (18), APPL (620) and SSND (8 + 8968)
pub fn kick_aif() -> Vec<u8> {
    let appl: Vec<u8> = b"stoc"
        .iter()
        .copied()
        .chain((0..KICK_APPL_SIZE - 4).map(|i| (i % 251) as u8))
        .collect();
    AiffBuilder::new()
        .comm(1, KICK_FRAMES, 16, KICK_RATE)
        .chunk(b"APPL", &appl)
        .ssnd(&kick_pcm())
        .build()
}

/// Number of top-level chunks in `kick_aif()`
pub const KICK_CHUNKS: usize = 3;
