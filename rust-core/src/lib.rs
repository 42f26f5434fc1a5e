//! FFT Stream - Real-Time Spectral Band-Pass Filter
//! 
//! Streams a decoded audio asset block by block through a forward FFT, a
//! quarter-block band-pass mask and an inverse FFT, writing the filtered
//! samples back for playback and exposing the spectra for visualization.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod audio;
pub mod error;
pub mod io;
pub mod stream;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::EngineError;
pub use io::load_wav;
pub use stream::{AudioAsset, Chunk, EngineConfig, FftAudioStream, FilterMask, SharedSnapshots, SpectralSnapshots, StreamState};
pub use audio::{AudioError, PlaybackStatus, PlayerConfig, StreamPlayer};
