//! Text chunking with configurable size and overlap.
//!
//! Windows are measured in characters, not bytes, so multi-byte text is never
//! split inside a code point.

use aixp_core::config::ChunkingConfig;
use aixp_core::{AppError, AppResult};

/// Validated chunking parameters.
///
/// `overlap < max_len` is guaranteed by construction, so every step of the
/// sliding window advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    max_len: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub const DEFAULT_MAX_LEN: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 150;

    /// Create a config, rejecting `max_len == 0` and `overlap >= max_len`.
    pub fn new(max_len: usize, overlap: usize) -> AppResult<Self> {
        if max_len == 0 {
            return Err(AppError::Config(
                "Chunk max_len must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_len {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than max_len ({})",
                overlap, max_len
            )));
        }
        Ok(Self { max_len, overlap })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn step(&self) -> usize {
        self.max_len - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_len: Self::DEFAULT_MAX_LEN,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

impl TryFrom<&ChunkingConfig> for ChunkConfig {
    type Error = AppError;

    fn try_from(config: &ChunkingConfig) -> AppResult<Self> {
        Self::new(config.max_len, config.overlap)
    }
}

/// Split text into overlapping windows.
///
/// Text of at most `max_len` characters comes back as a single chunk. Longer
/// text yields windows of `max_len` characters whose starts advance by
/// `max_len - overlap`; the last window ends exactly at the end of the text.
/// Empty text yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char, plus the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    if char_len <= config.max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.max_len).min(char_len);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());

        if end == char_len {
            break;
        }
        start += config.step();
    }

    tracing::debug!(
        "Chunked {} chars into {} chunks (max_len: {}, overlap: {})",
        char_len,
        chunks.len(),
        config.max_len,
        config.overlap
    );

    chunks
}
