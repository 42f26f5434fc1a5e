//! Error types for asset loading and engine setup

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Audio asset contains no samples")]
    EmptyAsset,

    #[error("Channel count must be at least 1")]
    InvalidChannelCount,

    #[error("Sample rate must be non-zero")]
    InvalidSampleRate,

    #[error("Block size must be a power of two and at least 4 (found: {0})")]
    InvalidBlockSize(usize),

    #[error("Failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}
