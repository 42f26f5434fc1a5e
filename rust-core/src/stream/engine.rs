//! Block-by-block spectral filter over a loaded audio asset
//!
//! Each call to [`FftAudioStream::process_block`] runs the fixed pipeline:
//! extract → forward FFT → clean snapshot → mask → filtered snapshot →
//! inverse FFT → wave snapshot → write back → advance.

use super::config::EngineConfig;
use super::fft::BlockFft;
use super::mask::FilterMask;
use super::samples::{AudioAsset, SampleBuffer};
use super::snapshots::SpectralSnapshots;
use crate::error::EngineError;
use num_complex::Complex;

/// Whether the playback host should keep requesting blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// A full block was produced and more data follows
    Continue,
    /// The final (possibly short or empty) chunk was produced
    EndOfStream,
}

/// Samples to hand to the playback sink after one block call
#[derive(Debug)]
pub struct Chunk<'a> {
    /// Filtered samples, borrowed from the sample store
    pub samples: &'a [i16],

    pub state: StreamState,
}

impl Chunk<'_> {
    pub fn is_end(&self) -> bool {
        self.state == StreamState::EndOfStream
    }
}

/// Round a filtered real value to the nearest sample, saturating at the i16 range
#[inline]
pub(crate) fn quantize(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Streaming FFT band-pass filter
pub struct FftAudioStream {
    config: EngineConfig,
    store: SampleBuffer,
    mask: FilterMask,
    fft: BlockFft,

    /// Working vector, reused for every block
    block: Vec<Complex<f64>>,

    snapshots: SpectralSnapshots,

    /// Read/write position in the store, always within `0..=store.len()`
    offset: usize,
}

impl FftAudioStream {
    /// Load an asset and prepare all block buffers
    ///
    /// # Errors
    /// Fails if the configured block size is not a power of two ≥ 4.
    pub fn load(asset: AudioAsset, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let n = config.block_size;
        let quarter = config.quarter();
        let store = SampleBuffer::from_asset(asset);

        log::debug!(
            "Loaded {} samples ({} ch @ {} Hz), block size {}",
            store.len(),
            store.channels(),
            store.sample_rate(),
            n
        );

        Ok(Self {
            config,
            store,
            mask: FilterMask::new(quarter),
            fft: BlockFft::new(n),
            block: vec![Complex::new(0.0, 0.0); n],
            snapshots: SpectralSnapshots::new(n),
            offset: 0,
        })
    }

    /// Replace the loaded asset, resetting position, cutoffs and snapshots
    ///
    /// FFT plans and working buffers are kept since `N` does not change.
    pub fn reload(&mut self, asset: AudioAsset) {
        self.store = SampleBuffer::from_asset(asset);
        self.mask = FilterMask::new(self.config.quarter());
        self.snapshots = SpectralSnapshots::new(self.config.block_size);
        self.offset = 0;

        log::debug!(
            "Reloaded {} samples ({} ch @ {} Hz)",
            self.store.len(),
            self.store.channels(),
            self.store.sample_rate()
        );
    }

    /// Filter the block at the current offset and advance
    ///
    /// The final block is zero-padded past the end of the store; only the
    /// samples that exist are written back and handed out.
    pub fn process_block(&mut self) -> Chunk<'_> {
        let n = self.config.block_size;
        let offset = self.offset;

        let taken = self.store.read_padded(offset, &mut self.block);

        self.fft.forward(&mut self.block);
        self.snapshots.clean_spectrum.copy_from_slice(&self.block);

        self.mask.apply(&mut self.block);
        self.snapshots.filtered_spectrum.copy_from_slice(&self.block);

        self.fft.inverse(&mut self.block);
        self.snapshots.filtered_wave.copy_from_slice(&self.block);
        self.snapshots.sequence += 1;

        self.store
            .write_from(offset, self.block[..taken].iter().map(|c| quantize(c.re)));

        let len = self.store.len();
        // A block ending exactly at the end still reports Continue; the next
        // call then returns an empty end-of-stream chunk.
        if offset + n <= len {
            self.offset = offset + n;
            Chunk {
                samples: &self.store.as_slice()[offset..offset + n],
                state: StreamState::Continue,
            }
        } else {
            self.offset = len;
            Chunk {
                samples: self.store.tail(offset),
                state: StreamState::EndOfStream,
            }
        }
    }

    /// Move the read position to `seconds`, clamped to the asset
    ///
    /// Takes effect at the next block call; no samples are touched.
    pub fn seek(&mut self, seconds: f64) {
        let len = self.store.len();
        let per_second = self.store.sample_rate() as f64 * self.store.channels() as f64;
        let target = (seconds * per_second).round();

        self.offset = if target.is_nan() || target <= 0.0 {
            0
        } else if target >= len as f64 {
            len
        } else {
            target as usize
        };
    }

    /// Set the lower cutoff bin; values outside `[0, N/4]` are ignored
    pub fn set_low(&mut self, low: f64) {
        if !self.mask.set_low(low) {
            log::debug!("Ignoring low cutoff {} (valid range 0..={})", low, self.mask.len());
        }
    }

    /// Set the upper cutoff bin; values outside `[0, N/4]` are ignored
    pub fn set_high(&mut self, high: f64) {
        if !self.mask.set_high(high) {
            log::debug!("Ignoring high cutoff {} (valid range 0..={})", high, self.mask.len());
        }
    }

    pub fn low(&self) -> f64 {
        self.mask.low()
    }

    pub fn high(&self) -> f64 {
        self.mask.high()
    }

    pub fn mask(&self) -> &FilterMask {
        &self.mask
    }

    /// Spectrum of the last block before filtering
    pub fn clean_spectrum(&self) -> &[Complex<f64>] {
        &self.snapshots.clean_spectrum
    }

    /// Spectrum of the last block after filtering
    pub fn filtered_spectrum(&self) -> &[Complex<f64>] {
        &self.snapshots.filtered_spectrum
    }

    /// Time-domain result of the last block
    pub fn filtered_wave(&self) -> &[Complex<f64>] {
        &self.snapshots.filtered_wave
    }

    pub fn snapshots(&self) -> &SpectralSnapshots {
        &self.snapshots
    }

    pub fn blocks_processed(&self) -> u64 {
        self.snapshots.sequence
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.offset >= self.store.len()
    }

    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    pub fn channel_count(&self) -> u16 {
        self.store.channels()
    }

    pub fn sample_rate(&self) -> u32 {
        self.store.sample_rate()
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    pub fn samples(&self) -> &[i16] {
        self.store.as_slice()
    }

    /// Current read position in seconds
    pub fn position_seconds(&self) -> f64 {
        self.offset as f64 / self.samples_per_second()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.store.len() as f64 / self.samples_per_second()
    }

    /// Wall-clock time one block lasts when played back
    pub fn block_duration_seconds(&self) -> f64 {
        self.config.block_size as f64 / self.samples_per_second()
    }

    fn samples_per_second(&self) -> f64 {
        self.store.sample_rate() as f64 * self.store.channels() as f64
    }
}
