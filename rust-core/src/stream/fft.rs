//! Complex FFT kernel for fixed-size blocks
//!
//! Forward and inverse transforms run in place over a caller-owned vector,
//! using scratch space allocated once at construction.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Forward/inverse FFT pair for one block length
pub struct BlockFft {
    /// Block length N
    size: usize,

    /// Forward plan (time → frequency)
    fft: Arc<dyn Fft<f64>>,

    /// Inverse plan (frequency → time)
    ifft: Arc<dyn Fft<f64>>,

    /// Shared in-place scratch
    scratch: Vec<Complex<f64>>,
}

impl BlockFft {
    /// Plan transforms for blocks of `size` samples
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        let scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        Self {
            size,
            fft,
            ifft,
            scratch,
        }
    }

    /// Forward DFT in place, standard bin order (bin 0 = DC), unnormalized
    pub fn forward(&mut self, buffer: &mut [Complex<f64>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.fft.process_with_scratch(buffer, &mut self.scratch);
    }

    /// Inverse DFT in place, scaled by 1/N so `inverse(forward(x)) == x`
    pub fn inverse(&mut self, buffer: &mut [Complex<f64>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.ifft.process_with_scratch(buffer, &mut self.scratch);

        let scale = 1.0 / self.size as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
    }
}
