//! Spectral helpers on top of rustfft.
//!
//! [`FftEngine`] owns one planner so the circular convolver and the spectrum
//! code share cached plans. The seminar buffers have arbitrary lengths (a
//! 10-sample circular buffer, a 2000-point analog grid), so any non-zero
//! length is accepted; rustfft picks a mixed-radix or Bluestein plan.
//!
//! `fftfreq`/`fftshift` follow the usual DFT bin ordering conventions.

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planner cache for forward and inverse transforms.
pub struct FftEngine {
    planner: FftPlanner<f64>,
}

impl FftEngine {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Unnormalized forward DFT of `data`, in place.
    pub fn fft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        if data.is_empty() {
            return Err(DspError::InvalidFftSize(0));
        }
        self.planner.plan_fft_forward(data.len()).process(data);
        Ok(())
    }

    /// Forward DFT of a real signal.
    pub fn fft_real(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        let mut buffer = to_complex(data);
        self.fft_inplace(&mut buffer)?;
        Ok(buffer)
    }

    /// Forward plan for `len` points, reused across calls.
    pub fn get_fft_forward(&mut self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner.plan_fft_forward(len)
    }

    /// Inverse (unnormalized) plan for `len` points.
    pub fn get_fft_inverse(&mut self, len: usize) -> Arc<dyn Fft<f64>> {
        self.planner.plan_fft_inverse(len)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Lift real samples into complex samples.
pub fn to_complex(data: &[f64]) -> Vec<Complex64> {
    data.iter().map(|&v| Complex64::new(v, 0.0)).collect()
}

/// Sample frequencies of an `n`-point DFT with sample spacing `d`.
///
/// Ordering matches the DFT output: `[0, 1, ..., ceil(n/2)-1, -floor(n/2), ..., -1] / (d*n)`.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (d * n as f64);
    let positive = (n + 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i < positive {
                i as isize
            } else {
                i as isize - n as isize
            };
            k as f64 * scale
        })
        .collect()
}

/// Rotate a DFT-ordered buffer so the zero-frequency bin lands in the middle.
pub fn fftshift<T: Clone>(data: &[T]) -> Vec<T> {
    let mut shifted = data.to_vec();
    shifted.rotate_right(data.len() / 2);
    shifted
}

/// Magnitude of each complex bin.
pub fn magnitudes(spectrum: &[Complex64]) -> Vec<f64> {
    spectrum.iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_cosine_lands_in_two_bins() {
        let mut engine = FftEngine::new();
        let n = 10;
        let tone: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 3.0 * i as f64 / n as f64).cos())
            .collect();

        let mags = magnitudes(&engine.fft_real(&tone).unwrap());
        for (k, m) in mags.iter().enumerate() {
            // Bins 3 and n-3 carry n/2 each
            let expected = if k == 3 || k == 7 { 5.0 } else { 0.0 };
            assert!((m - expected).abs() < 1e-9, "bin {}: {}", k, m);
        }
    }

    #[test]
    fn test_fft_of_impulse_is_flat() {
        let mut engine = FftEngine::new();
        let mut impulse = vec![0.0; 7];
        impulse[0] = 1.0;

        let spectrum = engine.fft_real(&impulse).unwrap();
        for bin in spectrum {
            assert!((bin.re - 1.0).abs() < 1e-12);
            assert!(bin.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_fft_rejected() {
        let mut engine = FftEngine::new();
        assert!(matches!(engine.fft_real(&[]), Err(DspError::InvalidFftSize(0))));
    }

    #[test]
    fn test_fftfreq_even_and_odd() {
        assert_eq!(fftfreq(4, 0.25), vec![0.0, 1.0, -2.0, -1.0]);
        assert_eq!(fftfreq(5, 0.2), vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_fftshift_centers_zero_frequency() {
        assert_eq!(fftshift(&fftfreq(4, 0.25)), vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(fftshift(&fftfreq(5, 0.2)), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }
}
