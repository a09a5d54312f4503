//! Linear and circular convolution.
//!
//! Linear convolution is computed directly. Circular convolution runs over a
//! fixed buffer of length `N` via forward FFT, pointwise multiply and inverse
//! FFT. When `N` is shorter than the linear output `Nx + Nh - 1`, the tail of
//! the linear result wraps around and adds onto the head of the buffer:
//!
//! ```text
//! y_circ[i] = sum over j = i (mod N) of y_lin[j]
//! ```
//!
//! That wrap-around is what the convolution demo animates, so nothing here
//! tries to prevent it.

use crate::error::{DspError, DspResult};
use crate::fft::{to_complex, FftEngine};
use crate::synth::{constant_pulse, ramp_kernel};
use lib_types::signal::DiscreteSignal;
use num_complex::Complex64;
use rustfft::Fft;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Imaginary residual above which the inverse FFT result is reported.
const IMAG_RESIDUAL_WARN: f64 = 1e-9;

/// A fixed-capacity buffer whose indices are taken modulo its length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularBuffer {
    samples: Vec<f64>,
}

impl CircularBuffer {
    /// Build a buffer of exactly `len` samples: `b[i] = sum_{j = i mod len} data[j]`.
    ///
    /// Data shorter than the buffer is zero-padded; samples past `len` wrap onto
    /// the head, so circular convolution of two folded operands equals the fold
    /// of their linear convolution.
    pub fn from_padded(data: &[f64], len: usize) -> DspResult<Self> {
        Ok(Self {
            samples: fold_linear(data, len)?,
        })
    }

    /// Buffer length `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a buffer has at least one slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index mod N` (negative indices wrap as well).
    #[inline]
    pub fn get(&self, index: isize) -> f64 {
        let n = self.samples.len() as isize;
        self.samples[index.rem_euclid(n) as usize]
    }

    /// The buffer contents rotated for step `n`: `[b[(n - k) mod N] for k in 0..N]`.
    ///
    /// Applied to the kernel this is h[(n - k) mod N], the circular counterpart of
    /// the reflected-and-shifted kernel h[n - k].
    pub fn rotated(&self, n: usize) -> Vec<f64> {
        let shift = n as isize;
        (0..self.samples.len() as isize)
            .map(|k| self.get(shift - k))
            .collect()
    }

    /// Borrow the samples.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Largest value in the buffer.
    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Circular convolution engine for a fixed kernel and buffer length.
///
/// The kernel spectrum is computed once; each call to [`CircularConvolver::convolve`]
/// only transforms the signal.
pub struct CircularConvolver {
    /// Pre-computed FFT of the zero-padded kernel.
    kernel_fft: Vec<Complex64>,

    /// Buffer length N.
    buffer_len: usize,

    /// Cached FFT plans.
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
}

impl CircularConvolver {
    /// Create a convolver for `kernel` over a buffer of `buffer_len` samples.
    ///
    /// A kernel longer than the buffer wraps onto its head.
    pub fn new(kernel: &[f64], buffer_len: usize) -> DspResult<Self> {
        if kernel.is_empty() {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }
        let padded = CircularBuffer::from_padded(kernel, buffer_len)?;

        let mut engine = FftEngine::new();
        let fft_forward = engine.get_fft_forward(buffer_len);
        let fft_inverse = engine.get_fft_inverse(buffer_len);

        let mut kernel_fft = to_complex(padded.as_slice());
        fft_forward.process(&mut kernel_fft);

        tracing::debug!(
            "CircularConvolver: buffer_len={}, kernel_len={}, wrapped={}",
            buffer_len,
            kernel.len(),
            kernel.len() > buffer_len
        );

        Ok(Self {
            kernel_fft,
            buffer_len,
            fft_forward,
            fft_inverse,
        })
    }

    /// Buffer length N.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Circularly convolve `signal` (zero-padded or wrapped to N) with the kernel.
    pub fn convolve(&self, signal: &[f64]) -> DspResult<CircularBuffer> {
        if signal.is_empty() {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }
        let padded = CircularBuffer::from_padded(signal, self.buffer_len)?;

        let mut spectrum = to_complex(padded.as_slice());
        self.fft_forward.process(&mut spectrum);

        for (s, h) in spectrum.iter_mut().zip(self.kernel_fft.iter()) {
            *s *= *h;
        }

        self.fft_inverse.process(&mut spectrum);

        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / self.buffer_len as f64;
        let residual = spectrum
            .iter()
            .map(|c| (c.im * scale).abs())
            .fold(0.0, f64::max);
        if residual > IMAG_RESIDUAL_WARN {
            tracing::warn!("Circular convolution imaginary residual {:.3e}", residual);
        } else {
            tracing::debug!("Circular convolution imaginary residual {:.3e}", residual);
        }

        let real: Vec<f64> = spectrum.iter().map(|c| c.re * scale).collect();
        CircularBuffer::from_padded(&real, self.buffer_len)
    }
}

/// Direct linear convolution: `y[n] = sum_k x[k] h[n - k]`, length `Nx + Nh - 1`.
pub fn linear_convolve(signal: &[f64], kernel: &[f64]) -> DspResult<Vec<f64>> {
    if signal.is_empty() || kernel.is_empty() {
        return Err(DspError::InsufficientData {
            needed: 1,
            got: signal.len().min(kernel.len()),
        });
    }

    let output_len = signal.len() + kernel.len() - 1;
    let mut output = vec![0.0; output_len];

    for (i, &s) in signal.iter().enumerate() {
        for (j, &k) in kernel.iter().enumerate() {
            output[i + j] += s * k;
        }
    }

    Ok(output)
}

/// Circular convolution of `signal` and `kernel` over a buffer of `buffer_len` samples.
pub fn circular_convolve(signal: &[f64], kernel: &[f64], buffer_len: usize) -> DspResult<CircularBuffer> {
    CircularConvolver::new(kernel, buffer_len)?.convolve(signal)
}

/// Linear convolution computed through a circular buffer long enough to hold
/// the whole result, so nothing wraps.
pub fn fft_convolve(signal: &[f64], kernel: &[f64]) -> DspResult<Vec<f64>> {
    if signal.is_empty() || kernel.is_empty() {
        return Err(DspError::InsufficientData {
            needed: 1,
            got: signal.len().min(kernel.len()),
        });
    }
    let output_len = signal.len() + kernel.len() - 1;
    let buffer = circular_convolve(signal, kernel, output_len)?;
    Ok(buffer.as_slice().to_vec())
}

/// Fold a linear result into `buffer_len` slots: `y[i] = sum_{j = i mod N} y_lin[j]`.
///
/// This is the closed form of circular convolution in terms of linear convolution.
/// The same reduction folds an operand longer than the buffer.
pub fn fold_linear(linear: &[f64], buffer_len: usize) -> DspResult<Vec<f64>> {
    if buffer_len == 0 {
        return Err(DspError::InvalidConfig("buffer length must be non-zero".into()));
    }
    let mut folded = vec![0.0; buffer_len];
    for (j, &v) in linear.iter().enumerate() {
        folded[j % buffer_len] += v;
    }
    Ok(folded)
}

/// Buffer indices that receive wrapped-around contributions, ascending and unique.
pub fn aliased_indices(signal_len: usize, kernel_len: usize, buffer_len: usize) -> Vec<usize> {
    if buffer_len == 0 || signal_len == 0 || kernel_len == 0 {
        return Vec::new();
    }
    let linear_len = signal_len + kernel_len - 1;
    let mut hit = vec![false; buffer_len];
    for j in buffer_len..linear_len {
        hit[j % buffer_len] = true;
    }
    hit.iter()
        .enumerate()
        .filter_map(|(i, &h)| h.then_some(i))
        .collect()
}

/// Everything the convolution demo precomputes before the first frame.
#[derive(Clone, Debug)]
pub struct ConvolutionSetup {
    /// Stationary signal x[k].
    pub x: DiscreteSignal,
    /// Kernel h[k].
    pub h: DiscreteSignal,
    /// x zero-padded (or wrapped) into the circular buffer.
    pub x_padded: CircularBuffer,
    /// h zero-padded (or wrapped) into the circular buffer.
    pub h_padded: CircularBuffer,
    /// Full linear convolution.
    pub y_lin: DiscreteSignal,
    /// Circular convolution over the buffer.
    pub y_circ: CircularBuffer,
}

impl ConvolutionSetup {
    /// Seminar setup: a pulse of `nx` ones against a ramp of `nh` taps from 1.0 to 0.1.
    pub fn pulse_and_ramp(nx: usize, nh: usize, buffer_len: usize) -> DspResult<Self> {
        Self::from_signals(constant_pulse(nx), ramp_kernel(nh, 1.0, 0.1), buffer_len)
    }

    /// Precompute linear and circular results for arbitrary signals.
    pub fn from_signals(x: DiscreteSignal, h: DiscreteSignal, buffer_len: usize) -> DspResult<Self> {
        let y_lin = DiscreteSignal::new(linear_convolve(x.as_slice(), h.as_slice())?);
        let y_circ = circular_convolve(x.as_slice(), h.as_slice(), buffer_len)?;
        let x_padded = CircularBuffer::from_padded(x.as_slice(), buffer_len)?;
        let h_padded = CircularBuffer::from_padded(h.as_slice(), buffer_len)?;

        tracing::info!(
            "Convolution setup: Nx={}, Nh={}, N={}, linear length={}, aliased={}",
            x.len(),
            h.len(),
            buffer_len,
            y_lin.len(),
            buffer_len < y_lin.len()
        );

        Ok(Self {
            x,
            h,
            x_padded,
            h_padded,
            y_lin,
            y_circ,
        })
    }

    /// Buffer length N.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.y_circ.len()
    }

    /// Linear output length L = Nx + Nh - 1.
    #[inline]
    pub fn linear_len(&self) -> usize {
        self.y_lin.len()
    }

    /// Whether the buffer is too short to hold the linear result.
    #[inline]
    pub fn is_aliased(&self) -> bool {
        self.buffer_len() < self.linear_len()
    }

    /// Buffer slots corrupted by wrap-around.
    pub fn aliased_indices(&self) -> Vec<usize> {
        aliased_indices(self.x.len(), self.h.len(), self.buffer_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < 1e-10, "Mismatch at index {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_linear_convolve_seminar_example() {
        let y = linear_convolve(&[1.0, 1.0, 1.0], &[1.0, 0.5]).unwrap();
        assert_close(&y, &[1.0, 1.5, 1.5, 0.5]);
    }

    #[test]
    fn test_linear_length_and_first_sample() {
        let x = [0.3, -1.2, 2.0, 0.7, 5.0];
        let h = [1.5, 0.25, -0.5];

        let y = linear_convolve(&x, &h).unwrap();
        assert_eq!(y.len(), x.len() + h.len() - 1);
        assert!((y[0] - x[0] * h[0]).abs() < 1e-12);
    }

    #[test]
    fn test_direct_convolve_shift() {
        // Convolving with [0, 1] should shift by one sample
        let y = linear_convolve(&[1.0, 2.0, 3.0, 4.0], &[0.0, 1.0]).unwrap();
        assert_eq!(y, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_circular_equals_linear_when_buffer_long_enough() {
        let x = [1.0, 1.0, 1.0];
        let h = [1.0, 0.5];

        let y_circ = circular_convolve(&x, &h, 4).unwrap();
        assert_close(y_circ.as_slice(), &[1.0, 1.5, 1.5, 0.5]);

        // Longer buffers hold the linear result followed by zeros
        let y_circ = circular_convolve(&x, &h, 7).unwrap();
        assert_close(y_circ.as_slice(), &[1.0, 1.5, 1.5, 0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_circular_short_buffer_wraps() {
        let y_circ = circular_convolve(&[1.0, 1.0, 1.0], &[1.0, 0.5], 2).unwrap();
        assert_close(y_circ.as_slice(), &[2.5, 2.0]);
    }

    #[test]
    fn test_circular_matches_fold_of_linear() {
        let x = crate::synth::constant_pulse(10);
        let h = crate::synth::ramp_kernel(10, 1.0, 0.1);
        let y_lin = linear_convolve(x.as_slice(), h.as_slice()).unwrap();

        // Buffers shorter than both operands as well as long ones
        for n in [1, 2, 3, 5, 10, 12, 19, 25] {
            let y_circ = circular_convolve(x.as_slice(), h.as_slice(), n).unwrap();
            let folded = fold_linear(&y_lin, n).unwrap();
            assert_close(y_circ.as_slice(), &folded);
        }
    }

    #[test]
    fn test_fft_convolve_matches_direct() {
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let kernel = vec![1.0, 0.5, 0.25];

        let direct = linear_convolve(&signal, &kernel).unwrap();
        let fft = fft_convolve(&signal, &kernel).unwrap();
        assert_close(&direct, &fft);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(linear_convolve(&[], &[1.0]).is_err());
        assert!(circular_convolve(&[1.0], &[], 4).is_err());
        assert!(circular_convolve(&[1.0], &[1.0], 0).is_err());
    }

    #[test]
    fn test_circular_buffer_wraps_indices() {
        let buffer = CircularBuffer::from_padded(&[1.0, 2.0, 3.0], 4).unwrap();

        assert_eq!(buffer.get(4), 1.0);
        assert_eq!(buffer.get(-1), 0.0);
        assert_eq!(buffer.get(-2), 3.0);
        // h[(2 - k) mod 4] for k = 0..4
        assert_eq!(buffer.rotated(2), vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_long_operand_wraps_into_buffer() {
        let buffer = CircularBuffer::from_padded(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(buffer.as_slice(), &[9.0, 6.0]);

        let y_circ = circular_convolve(&[1.0, -2.0, 0.5], &[0.25, 1.0, 3.0, -1.0], 3).unwrap();
        let y_lin = linear_convolve(&[1.0, -2.0, 0.5], &[0.25, 1.0, 3.0, -1.0]).unwrap();
        assert_close(y_circ.as_slice(), &fold_linear(&y_lin, 3).unwrap());
    }

    #[test]
    fn test_aliased_indices() {
        // L = 4, N = 2: j = 2, 3 wrap onto 0, 1
        assert_eq!(aliased_indices(3, 2, 2), vec![0, 1]);
        // L = 19, N = 10: j = 10..19 wrap onto 0..9
        assert_eq!(aliased_indices(10, 10, 10), (0..9).collect::<Vec<_>>());
        assert!(aliased_indices(3, 2, 4).is_empty());
    }

    #[test]
    fn test_seminar_setup() {
        let setup = ConvolutionSetup::pulse_and_ramp(10, 10, 10).unwrap();

        assert_eq!(setup.linear_len(), 19);
        assert_eq!(setup.buffer_len(), 10);
        assert!(setup.is_aliased());

        // The last buffer slot is never overwritten: L - N = 9 wrapped samples
        assert!((setup.y_circ.as_slice()[9] - setup.y_lin[9]).abs() < 1e-10);
        // Slot 0 collects y_lin[0] + y_lin[10]
        let expected = setup.y_lin[0] + setup.y_lin[10];
        assert!((setup.y_circ.as_slice()[0] - expected).abs() < 1e-10);
    }
}
