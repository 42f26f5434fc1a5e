//! Python bindings for the block-by-block filter engine

use pyo3::prelude::*;
use numpy::{Complex64, PyArray1, PyReadonlyArray1};
use crate::io::load_wav;
use crate::stream::{AudioAsset, EngineConfig, FftAudioStream, config::DEFAULT_BLOCK_SIZE};
use super::runtime_error;

fn asset_from_array(samples: PyReadonlyArray1<i16>, channels: u16, sample_rate: u32) -> PyResult<AudioAsset> {
    let samples = samples.as_slice().map_err(runtime_error)?.to_vec();
    AudioAsset::new(samples, channels, sample_rate).map_err(runtime_error)
}

/// Streaming FFT band-pass filter exposed to Python
///
/// Drive it manually with `process_block()`; useful for offline rendering
/// and for inspecting the spectra without an audio device.
#[pyclass(name = "FftAudioStream", unsendable)]
pub struct PyFftAudioStream {
    stream: FftAudioStream,
}

#[pymethods]
impl PyFftAudioStream {
    /// Create a stream from interleaved int16 samples
    ///
    /// Args:
    ///     samples: Interleaved PCM samples (numpy int16 array, non-empty)
    ///     channels: Channel count
    ///     sample_rate: Sample rate in Hz
    ///     block_size: Block length N (power of 2, >= 4)
    #[new]
    #[pyo3(signature = (samples, channels, sample_rate, block_size=DEFAULT_BLOCK_SIZE))]
    fn new(
        samples: PyReadonlyArray1<i16>,
        channels: u16,
        sample_rate: u32,
        block_size: usize,
    ) -> PyResult<Self> {
        let asset = asset_from_array(samples, channels, sample_rate)?;
        let stream = FftAudioStream::load(asset, EngineConfig::with_block_size(block_size))
            .map_err(runtime_error)?;
        Ok(Self { stream })
    }

    /// Create a stream from a WAV file
    #[staticmethod]
    #[pyo3(signature = (path, block_size=DEFAULT_BLOCK_SIZE))]
    fn from_wav(path: &str, block_size: usize) -> PyResult<Self> {
        let asset = load_wav(path).map_err(runtime_error)?;
        let stream = FftAudioStream::load(asset, EngineConfig::with_block_size(block_size))
            .map_err(runtime_error)?;
        Ok(Self { stream })
    }

    /// Replace the loaded samples (resets position and cutoffs)
    fn load(&mut self, samples: PyReadonlyArray1<i16>, channels: u16, sample_rate: u32) -> PyResult<()> {
        let asset = asset_from_array(samples, channels, sample_rate)?;
        self.stream.reload(asset);
        Ok(())
    }

    /// Filter the next block
    ///
    /// Returns:
    ///     Tuple of (chunk as int16 array, more_data)
    fn process_block<'py>(&mut self, py: Python<'py>) -> (&'py PyArray1<i16>, bool) {
        let chunk = self.stream.process_block();
        let more = !chunk.is_end();
        (PyArray1::from_slice(py, chunk.samples), more)
    }

    /// Move the read position (seconds, clamped to the asset)
    fn seek(&mut self, seconds: f64) {
        self.stream.seek(seconds);
    }

    #[getter]
    fn low(&self) -> f64 {
        self.stream.low()
    }

    /// Values outside [0, N/4] are ignored
    #[setter]
    fn set_low(&mut self, value: f64) {
        self.stream.set_low(value);
    }

    #[getter]
    fn high(&self) -> f64 {
        self.stream.high()
    }

    /// Values outside [0, N/4] are ignored
    #[setter]
    fn set_high(&mut self, value: f64) {
        self.stream.set_high(value);
    }

    /// Spectrum of the last block before filtering
    fn clean_spectrum<'py>(&self, py: Python<'py>) -> &'py PyArray1<Complex64> {
        PyArray1::from_slice(py, self.stream.clean_spectrum())
    }

    /// Spectrum of the last block after filtering
    fn filtered_spectrum<'py>(&self, py: Python<'py>) -> &'py PyArray1<Complex64> {
        PyArray1::from_slice(py, self.stream.filtered_spectrum())
    }

    /// Time-domain result of the last block
    fn filtered_wave<'py>(&self, py: Python<'py>) -> &'py PyArray1<Complex64> {
        PyArray1::from_slice(py, self.stream.filtered_wave())
    }

    /// Current (possibly filtered) sample store
    fn samples<'py>(&self, py: Python<'py>) -> &'py PyArray1<i16> {
        PyArray1::from_slice(py, self.stream.samples())
    }

    #[getter]
    fn offset(&self) -> usize {
        self.stream.offset()
    }

    #[getter]
    fn position(&self) -> f64 {
        self.stream.position_seconds()
    }

    #[getter]
    fn duration(&self) -> f64 {
        self.stream.duration_seconds()
    }

    #[getter]
    fn sample_count(&self) -> usize {
        self.stream.sample_count()
    }

    #[getter]
    fn channel_count(&self) -> u16 {
        self.stream.channel_count()
    }

    #[getter]
    fn sample_rate(&self) -> u32 {
        self.stream.sample_rate()
    }

    #[getter]
    fn block_size(&self) -> usize {
        self.stream.block_size()
    }

    #[getter]
    fn blocks_processed(&self) -> u64 {
        self.stream.blocks_processed()
    }
}
