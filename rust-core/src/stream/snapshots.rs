//! Per-block output snapshots and a lock-guarded exchange for other threads

use num_complex::Complex;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The three buffers produced by one block call
#[derive(Debug, Clone)]
pub struct SpectralSnapshots {
    /// Spectrum straight after the forward FFT
    pub clean_spectrum: Vec<Complex<f64>>,

    /// Spectrum after the filter mask
    pub filtered_spectrum: Vec<Complex<f64>>,

    /// Time-domain block after the inverse FFT
    pub filtered_wave: Vec<Complex<f64>>,

    /// Number of blocks processed when this snapshot was taken (0 = none yet)
    pub sequence: u64,
}

impl SpectralSnapshots {
    /// Zeroed snapshots for blocks of `size` samples
    pub fn new(size: usize) -> Self {
        let zero = Complex::new(0.0, 0.0);
        Self {
            clean_spectrum: vec![zero; size],
            filtered_spectrum: vec![zero; size],
            filtered_wave: vec![zero; size],
            sequence: 0,
        }
    }

    /// Block length N
    pub fn len(&self) -> usize {
        self.filtered_wave.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_wave.is_empty()
    }

    /// Overwrite with `other`, reusing existing allocations
    pub fn copy_from(&mut self, other: &SpectralSnapshots) {
        copy_reusing(&mut self.clean_spectrum, &other.clean_spectrum);
        copy_reusing(&mut self.filtered_spectrum, &other.filtered_spectrum);
        copy_reusing(&mut self.filtered_wave, &other.filtered_wave);
        self.sequence = other.sequence;
    }
}

fn copy_reusing(dst: &mut Vec<Complex<f64>>, src: &[Complex<f64>]) {
    if dst.len() == src.len() {
        dst.copy_from_slice(src);
    } else {
        dst.clear();
        dst.extend_from_slice(src);
    }
}

/// Snapshot exchange between the block-producing thread and readers
///
/// Publishing and reading both take the lock, so a reader always sees the
/// three buffers of one and the same block.
#[derive(Clone)]
pub struct SharedSnapshots {
    inner: Arc<Mutex<SpectralSnapshots>>,
}

impl SharedSnapshots {
    pub fn new(size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SpectralSnapshots::new(size))),
        }
    }

    /// Copy `snapshots` into the shared slot
    pub fn publish(&self, snapshots: &SpectralSnapshots) {
        self.lock().copy_from(snapshots);
    }

    /// Borrow the latest snapshots under the lock
    pub fn read<R>(&self, f: impl FnOnce(&SpectralSnapshots) -> R) -> R {
        f(&self.lock())
    }

    /// Owned copy of the latest snapshots
    pub fn latest(&self) -> SpectralSnapshots {
        self.read(|s| s.clone())
    }

    /// Owned copy only if newer than `seen`
    pub fn newer_than(&self, seen: u64) -> Option<SpectralSnapshots> {
        self.read(|s| (s.sequence > seen).then(|| s.clone()))
    }

    /// Sequence number of the latest published block
    pub fn sequence(&self) -> u64 {
        self.read(|s| s.sequence)
    }

    // Only `copy_from` mutates the buffers, so a poisoned guard still holds
    // one whole block.
    fn lock(&self) -> MutexGuard<'_, SpectralSnapshots> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("Snapshot lock was poisoned, recovering");
            self.inner.clear_poison();
            poisoned.into_inner()
        })
    }
}
