//! Band-pass gain mask over one quarter-block of the spectrum
//!
//! The mask holds `N/4` gains. The full `N`-bin spectrum is split into four
//! quarters: quarters 0 and 2 use the mask directly, quarters 1 and 3 use it
//! mirrored around `N/4` so the negative-frequency image of a real signal is
//! gated the same way as its positive-frequency counterpart.

use num_complex::Complex;

const PASS: Complex<f64> = Complex::new(1.0, 0.0);
const REJECT: Complex<f64> = Complex::new(0.0, 0.0);

/// Frequency-domain gain vector with independent low/high cutoffs
#[derive(Debug, Clone)]
pub struct FilterMask {
    low: f64,
    high: f64,
    gains: Vec<Complex<f64>>,
}

impl FilterMask {
    /// Create an open mask (`low = 0`, `high = quarter`) of length `quarter`
    pub fn new(quarter: usize) -> Self {
        let mut mask = Self {
            low: 0.0,
            high: quarter as f64,
            gains: vec![REJECT; quarter],
        };
        mask.rebuild();
        mask
    }

    /// Mask length (`N/4`)
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn gains(&self) -> &[Complex<f64>] {
        &self.gains
    }

    /// Whether `v` lies in `[0, N/4]`; NaN never does
    fn in_range(&self, v: f64) -> bool {
        v >= 0.0 && v <= self.gains.len() as f64
    }

    /// Set the lower cutoff; out-of-range values are ignored
    ///
    /// # Returns
    /// `true` if the value was accepted and the mask rebuilt
    pub fn set_low(&mut self, low: f64) -> bool {
        if !self.in_range(low) {
            return false;
        }
        self.low = low;
        self.rebuild();
        true
    }

    /// Set the upper cutoff; out-of-range values are ignored
    ///
    /// # Returns
    /// `true` if the value was accepted and the mask rebuilt
    pub fn set_high(&mut self, high: f64) -> bool {
        if !self.in_range(high) {
            return false;
        }
        self.high = high;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        let (low, high) = (self.low, self.high);
        for (i, gain) in self.gains.iter_mut().enumerate() {
            let bin = i as f64;
            *gain = if bin > low && bin < high { PASS } else { REJECT };
        }
    }

    /// Gain at mask index `index`
    ///
    /// Index `N/4` is reached by the mirrored quarters at their first bin and
    /// lies one past the stored range. It is answered as reject: `high` never
    /// exceeds `N/4`, so the pass predicate can never hold there.
    #[inline]
    pub fn gain(&self, index: usize) -> Complex<f64> {
        self.gains.get(index).copied().unwrap_or(REJECT)
    }

    /// Mask index that applies to bin `bin` of an `N = 4 * len()` spectrum
    #[inline]
    pub fn index_for_bin(&self, bin: usize) -> usize {
        let quarter = self.gains.len();
        let segment = bin / quarter;
        let i = bin % quarter;
        if segment % 2 == 0 {
            i
        } else {
            quarter - i
        }
    }

    /// Multiply every bin of `spectrum` (length `4 * len()`) by its gain in place
    pub fn apply(&self, spectrum: &mut [Complex<f64>]) {
        let quarter = self.gains.len();
        debug_assert_eq!(spectrum.len(), quarter * 4);

        for (segment, chunk) in spectrum.chunks_exact_mut(quarter).enumerate() {
            if segment % 2 == 0 {
                for (bin, gain) in chunk.iter_mut().zip(&self.gains) {
                    *bin *= *gain;
                }
            } else {
                for (i, bin) in chunk.iter_mut().enumerate() {
                    *bin *= self.gain(quarter - i);
                }
            }
        }
    }
}
