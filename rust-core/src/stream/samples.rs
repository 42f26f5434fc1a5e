//! Decoded audio assets and the in-place sample store

use crate::error::EngineError;
use num_complex::Complex;

/// Fully decoded audio asset as delivered by a loader
///
/// Samples are interleaved across channels (frame-major), 16-bit signed PCM.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl AudioAsset {
    /// Create a new asset
    ///
    /// # Errors
    /// Rejects empty sample sequences, zero channels and zero sample rate.
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Result<Self, EngineError> {
        if samples.is_empty() {
            return Err(EngineError::EmptyAsset);
        }
        if channels == 0 {
            return Err(EngineError::InvalidChannelCount);
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate);
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Fixed-length sample store, rewritten block by block during playback
#[derive(Debug)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn from_asset(asset: AudioAsset) -> Self {
        Self {
            samples: asset.samples,
            channels: asset.channels,
            sample_rate: asset.sample_rate,
        }
    }

    /// Total number of samples (all channels)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }

    /// Samples from `start` to the end of the store (empty if `start` is past the end)
    pub fn tail(&self, start: usize) -> &[i16] {
        let start = start.min(self.samples.len());
        &self.samples[start..]
    }

    /// Copy `out.len()` samples starting at `offset` as real-valued complex
    /// numbers, zero-padding past the end
    ///
    /// # Returns
    /// Number of samples actually taken from the store
    pub fn read_padded(&self, offset: usize, out: &mut [Complex<f64>]) -> usize {
        let available = self.tail(offset);
        let n = available.len().min(out.len());

        for (dst, &src) in out[..n].iter_mut().zip(available) {
            *dst = Complex::new(src as f64, 0.0);
        }
        out[n..].fill(Complex::new(0.0, 0.0));

        n
    }

    /// Overwrite samples starting at `offset`; values past the end are dropped
    ///
    /// # Returns
    /// Number of samples written
    pub fn write_from(&mut self, offset: usize, values: impl IntoIterator<Item = i16>) -> usize {
        let start = offset.min(self.samples.len());
        let mut written = 0;
        for (dst, value) in self.samples[start..].iter_mut().zip(values) {
            *dst = value;
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(samples: Vec<i16>) -> SampleBuffer {
        SampleBuffer::from_asset(AudioAsset::new(samples, 1, 8000).unwrap())
    }

    #[test]
    fn test_asset_validation() {
        assert!(matches!(AudioAsset::new(vec![], 1, 44100), Err(EngineError::EmptyAsset)));
        assert!(matches!(
            AudioAsset::new(vec![1], 0, 44100),
            Err(EngineError::InvalidChannelCount)
        ));
        assert!(matches!(
            AudioAsset::new(vec![1], 1, 0),
            Err(EngineError::InvalidSampleRate)
        ));
    }

    #[test]
    fn test_asset_duration() {
        let asset = AudioAsset::new(vec![0; 88200], 2, 44100).unwrap();
        assert!((asset.duration_seconds() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_read_padded_zero_fills_tail() {
        let store = buffer(vec![1, 2, 3, 4, 5]);
        let mut out = vec![Complex::new(9.0, 9.0); 4];

        let n = store.read_padded(3, &mut out);

        assert_eq!(n, 2);
        let re: Vec<f64> = out.iter().map(|c| c.re).collect();
        assert_eq!(re, vec![4.0, 5.0, 0.0, 0.0]);
        assert!(out.iter().all(|c| c.im == 0.0));
    }

    #[test]
    fn test_read_padded_past_end() {
        let store = buffer(vec![1, 2, 3]);
        let mut out = vec![Complex::new(9.0, 0.0); 2];

        assert_eq!(store.read_padded(10, &mut out), 0);
        assert!(out.iter().all(|c| c.re == 0.0 && c.im == 0.0));
    }

    #[test]
    fn test_write_never_resizes() {
        let mut store = buffer(vec![0; 5]);

        let written = store.write_from(3, [7, 8, 9, 10]);

        assert_eq!(written, 2);
        assert_eq!(store.len(), 5);
        assert_eq!(store.as_slice(), &[0, 0, 0, 7, 8]);
    }
}
