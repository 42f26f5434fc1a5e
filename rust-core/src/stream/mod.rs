//! Streaming FFT band-pass engine

pub mod config;
pub mod samples;
pub mod mask;
pub mod fft;
pub mod snapshots;
pub mod engine;

pub use config::EngineConfig;
pub use samples::{AudioAsset, SampleBuffer};
pub use mask::FilterMask;
pub use fft::BlockFft;
pub use snapshots::{SpectralSnapshots, SharedSnapshots};
pub use engine::{FftAudioStream, Chunk, StreamState};
