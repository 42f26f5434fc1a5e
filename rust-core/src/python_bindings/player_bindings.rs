//! Python bindings for real-time playback

use pyo3::prelude::*;
use numpy::PyArray1;
use crate::audio::{PlaybackStatus, PlayerConfig, StreamPlayer};
use crate::io::load_wav;
use crate::stream::{EngineConfig, FftAudioStream, config::DEFAULT_BLOCK_SIZE};
use super::runtime_error;

fn status_name(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Stopped => "stopped",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Playing => "playing",
    }
}

/// Real-time filtered playback exposed to Python
///
/// Filtering runs on a Rust thread; Python only adjusts cutoffs and polls
/// snapshots (e.g. at display refresh rate).
#[pyclass(name = "StreamPlayer", unsendable)]
pub struct PyStreamPlayer {
    player: StreamPlayer,
}

#[pymethods]
impl PyStreamPlayer {
    /// Open a WAV file for playback
    ///
    /// Args:
    ///     path: WAV file path
    ///     block_size: Block length N (power of 2, >= 4)
    ///     ring_blocks: Playback buffer size in blocks
    #[new]
    #[pyo3(signature = (path, block_size=DEFAULT_BLOCK_SIZE, ring_blocks=4))]
    fn new(path: &str, block_size: usize, ring_blocks: usize) -> PyResult<Self> {
        let asset = load_wav(path).map_err(runtime_error)?;
        let stream = FftAudioStream::load(asset, EngineConfig::with_block_size(block_size))
            .map_err(runtime_error)?;

        let config = PlayerConfig {
            ring_blocks,
            ..PlayerConfig::default()
        };

        Ok(Self {
            player: StreamPlayer::new(stream, config),
        })
    }

    /// Replace the playing WAV file
    ///
    /// Playback stops; the next play() opens the device at the new file's
    /// channel count and sample rate.
    fn load(&mut self, path: &str) -> PyResult<()> {
        let asset = load_wav(path).map_err(runtime_error)?;
        self.player.load(asset).map_err(runtime_error)
    }

    /// Start or resume playback
    ///
    /// Returns:
    ///     Output device name
    fn play(&mut self) -> PyResult<String> {
        self.player.play().map_err(runtime_error)
    }

    fn pause(&mut self) -> PyResult<()> {
        self.player.pause().map_err(runtime_error)
    }

    /// Toggle play/pause, returning the new status
    fn toggle(&mut self) -> PyResult<&'static str> {
        self.player.toggle().map(status_name).map_err(runtime_error)
    }

    /// Stop and rewind to the start
    fn stop(&mut self) {
        self.player.stop();
    }

    /// Returns one of "stopped", "paused", "playing"
    fn status(&self) -> &'static str {
        status_name(self.player.status())
    }

    fn seek(&self, seconds: f64) -> PyResult<()> {
        self.player.seek(seconds).map_err(runtime_error)
    }

    fn set_low(&self, value: f64) -> PyResult<()> {
        self.player.set_low(value).map_err(runtime_error)
    }

    fn set_high(&self, value: f64) -> PyResult<()> {
        self.player.set_high(value).map_err(runtime_error)
    }

    /// Current (low, high) cutoffs
    fn cutoffs(&self) -> PyResult<(f64, f64)> {
        self.player
            .with_engine(|e| (e.low(), e.high()))
            .map_err(runtime_error)
    }

    /// Playback position in seconds
    fn position(&self) -> PyResult<f64> {
        self.player
            .with_engine(|e| e.position_seconds())
            .map_err(runtime_error)
    }

    /// Get the latest block snapshots
    ///
    /// Args:
    ///     since: Only return snapshots newer than this sequence number
    ///
    /// Returns:
    ///     Dictionary with keys: 'clean_spectrum', 'filtered_spectrum',
    ///     'filtered_wave', 'sequence'
    ///     or None if no new data
    #[pyo3(signature = (since=0))]
    fn get_snapshots<'py>(&self, py: Python<'py>, since: u64) -> Option<PyObject> {
        self.player.snapshots().newer_than(since).map(|snapshots| {
            let dict = pyo3::types::PyDict::new(py);

            dict.set_item("clean_spectrum",
                         PyArray1::from_vec(py, snapshots.clean_spectrum)).ok();
            dict.set_item("filtered_spectrum",
                         PyArray1::from_vec(py, snapshots.filtered_spectrum)).ok();
            dict.set_item("filtered_wave",
                         PyArray1::from_vec(py, snapshots.filtered_wave)).ok();
            dict.set_item("sequence", snapshots.sequence).ok();

            dict.into()
        })
    }
}
