//! Band-limited reconstruction from uniform samples.
//!
//! The sampling demo compares an oversampled "analog" Gaussian-windowed cosine
//! with its sinc-interpolated reconstruction from samples taken at `f_sample`:
//!
//! ```text
//! s_rec(t) = sum_n s[n] * sinc((t - t_n) / dt),   sinc(x) = sin(pi x) / (pi x)
//! ```
//!
//! Samples are generated over a window 1.5x wider than the view, so that the
//! reconstruction near the view edges still sees neighbours on both sides.
//! Above the Nyquist frequency `f_sample / 2` the reconstruction converges to an
//! alias instead of the original, which shows up in the error trace and as
//! overlapping spectral images at `+/- f_sample`.

use crate::error::{DspError, DspResult};
use crate::fft::{fftfreq, fftshift, magnitudes, FftEngine};
use crate::synth::{gaussian_cosine_at, linspace};
use lib_types::signal::{SampledSignal, Spectrum};
use lib_types::units::{Hertz, Seconds};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default number of points on the analog reference grid.
pub const DEFAULT_ANALOG_RES: usize = 2000;

/// Default view window (the view spans `[-T_view/2, T_view/2]`).
pub const DEFAULT_T_VIEW: Seconds = Seconds(2.0);

/// Ratio of the sample generation window to the view window.
pub const GENERATE_WINDOW_RATIO: f64 = 1.5;

/// Normalized sinc: `sin(pi x) / (pi x)`, 1 at `x = 0`.
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-15 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Parameters of one sampling demonstration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Carrier frequency of the test signal.
    pub f_sig: Hertz,
    /// Sample rate.
    pub f_sample: Hertz,
    /// Width of the view window.
    pub t_view: Seconds,
    /// Points on the analog reference grid.
    pub analog_res: usize,
}

impl SamplingParams {
    /// Parameters with the seminar's default view window and resolution.
    pub fn new(f_sig: Hertz, f_sample: Hertz) -> Self {
        Self {
            f_sig,
            f_sample,
            t_view: DEFAULT_T_VIEW,
            analog_res: DEFAULT_ANALOG_RES,
        }
    }

    /// Override the view window.
    pub fn with_view(mut self, t_view: Seconds) -> Self {
        self.t_view = t_view;
        self
    }

    /// Check that the parameters describe a computable demonstration.
    pub fn validate(&self) -> DspResult<()> {
        if !(self.f_sample.0 > 0.0) {
            return Err(DspError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.f_sample.0
            )));
        }
        if !(self.t_view.0 > 0.0) {
            return Err(DspError::InvalidConfig(format!(
                "view window must be positive, got {}",
                self.t_view.0
            )));
        }
        if !self.f_sig.0.is_finite() {
            return Err(DspError::InvalidConfig("signal frequency must be finite".into()));
        }
        if self.analog_res < 2 {
            return Err(DspError::InsufficientData {
                needed: 2,
                got: self.analog_res,
            });
        }
        Ok(())
    }

    /// Sample period.
    #[inline]
    pub fn dt(&self) -> Seconds {
        self.f_sample.to_period()
    }

    /// Nyquist frequency of the sample rate.
    #[inline]
    pub fn nyquist(&self) -> Hertz {
        self.f_sample.nyquist()
    }

    /// Whether the signal frequency lies above Nyquist.
    #[inline]
    pub fn is_undersampled(&self) -> bool {
        self.f_sig > self.nyquist()
    }

    /// Half-width of the view window.
    #[inline]
    pub fn half_view(&self) -> Seconds {
        self.t_view / 2.0
    }

    /// Width of the window samples are generated over.
    #[inline]
    pub fn t_generate(&self) -> Seconds {
        self.t_view * GENERATE_WINDOW_RATIO
    }
}

/// Sample the test signal at `n * dt` for every integer `n` inside the generation window.
pub fn generate_samples(params: &SamplingParams) -> SampledSignal {
    let dt = params.dt();
    let half = params.t_generate().0 / 2.0;
    let n_min = (-half / dt.0).ceil() as i64;
    let n_max = (half / dt.0).floor() as i64;

    let times: Vec<f64> = (n_min..=n_max).map(|n| n as f64 * dt.0).collect();
    let samples = gaussian_cosine_at(&times, params.f_sig);

    SampledSignal::new(samples, dt, Seconds(n_min as f64 * dt.0))
}

/// The oversampled analog reference on `linspace(-T_view/2, T_view/2, analog_res)`.
pub fn analog_reference(params: &SamplingParams) -> (Vec<f64>, Vec<f64>) {
    let half = params.half_view().0;
    let times = linspace(-half, half, params.analog_res);
    let values = gaussian_cosine_at(&times, params.f_sig);
    (times, values)
}

/// The `(times x samples)` interpolation matrix `sinc((t_i - t_n) / dt)`.
pub fn sinc_matrix(times: &[f64], samples: &SampledSignal) -> Array2<f64> {
    let dt = samples.dt.0;
    Array2::from_shape_fn((times.len(), samples.len()), |(i, n)| {
        sinc((times[i] - samples.time_at(n).0) / dt)
    })
}

/// Sinc-interpolate `samples` at every instant of `times`.
pub fn reconstruct(times: &[f64], samples: &SampledSignal) -> DspResult<Vec<f64>> {
    if samples.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    let weights = Array1::from_vec(samples.samples.clone());
    Ok(sinc_matrix(times, samples).dot(&weights).to_vec())
}

/// Mean of the squared pointwise difference.
pub fn mean_squared_error(reference: &[f64], estimate: &[f64]) -> DspResult<f64> {
    if reference.len() != estimate.len() {
        return Err(DspError::LengthMismatch {
            expected: reference.len(),
            actual: estimate.len(),
        });
    }
    if reference.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    let sum: f64 = reference
        .iter()
        .zip(estimate)
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    Ok(sum / reference.len() as f64)
}

/// Centered magnitude spectrum of `signal`, with bins spaced for sample spacing `d`.
///
/// The DFT is scaled by `1/N`, shifted so zero frequency sits in the middle and
/// normalized to unit peak. An all-zero signal yields an all-zero spectrum.
pub fn magnitude_spectrum(signal: &[f64], d: f64) -> DspResult<Spectrum> {
    if signal.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    let n = signal.len();

    let mut engine = FftEngine::new();
    let bins = engine.fft_real(signal)?;
    let scale = 1.0 / n as f64;
    let scaled: Vec<f64> = magnitudes(&bins).into_iter().map(|m| m * scale).collect();

    let mut spectrum = Spectrum::new(fftshift(&fftfreq(n, d)), fftshift(&scaled));
    if spectrum.peak() == 0.0 {
        tracing::debug!("Spectrum peak is zero, skipping normalization");
    }
    spectrum.normalize();
    Ok(spectrum)
}

/// First-order spectral images at `k * f_sample` for `k` in `{-1, 1}`.
pub fn alias_images(spectrum: &Spectrum, f_sample: Hertz) -> Vec<(i32, Spectrum)> {
    [-1, 1]
        .into_iter()
        .map(|k| (k, spectrum.shifted(f_sample * k as f64)))
        .collect()
}

/// Precomputed data for one sampling demonstration.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    /// Parameters the data was computed for.
    pub params: SamplingParams,
    /// Analog reference grid.
    pub analog_times: Vec<f64>,
    /// Analog reference values.
    pub analog: Vec<f64>,
    /// Samples over the generation window.
    pub samples: SampledSignal,
    /// Reconstruction on the analog grid.
    pub reconstructed: Vec<f64>,
    /// `analog - reconstructed`.
    pub error: Vec<f64>,
    /// Mean of `error^2`.
    pub mse: f64,
    /// Normalized, centered spectrum of the analog reference.
    pub spectrum: Spectrum,
}

impl Reconstruction {
    /// Run the whole numeric pipeline for `params`.
    pub fn compute(params: &SamplingParams) -> DspResult<Self> {
        params.validate()?;

        let (analog_times, analog) = analog_reference(params);
        let samples = generate_samples(params);
        let reconstructed = reconstruct(&analog_times, &samples)?;

        let error: Vec<f64> = analog
            .iter()
            .zip(&reconstructed)
            .map(|(a, r)| a - r)
            .collect();
        let mse = mean_squared_error(&analog, &reconstructed)?;

        // Bin spacing follows T_view / analog_res rather than the grid step
        let d = params.t_view.0 / params.analog_res as f64;
        let spectrum = magnitude_spectrum(&analog, d)?;

        tracing::debug!(
            "Reconstruction: f_sig={} Hz, f_sample={} Hz, {} samples, MSE={:.3e}",
            params.f_sig.0,
            params.f_sample.0,
            samples.len(),
            mse
        );
        if params.is_undersampled() {
            tracing::warn!(
                "f_sig={} Hz exceeds Nyquist {} Hz; reconstruction will alias",
                params.f_sig.0,
                params.nyquist().0
            );
        }

        Ok(Self {
            params: *params,
            analog_times,
            analog,
            samples,
            reconstructed,
            error,
            mse,
            spectrum,
        })
    }

    /// Samples that fall inside the view window, as `(t, value)` pairs.
    pub fn samples_in_view(&self) -> Vec<(f64, f64)> {
        let half = self.params.half_view();
        self.samples.within(-half, half)
    }

    /// Largest absolute reconstruction error.
    pub fn max_abs_error(&self) -> f64 {
        self.error.iter().map(|e| e.abs()).fold(0.0, f64::max)
    }

    /// Spectral images at `+/- f_sample`.
    pub fn alias_images(&self) -> Vec<(i32, Spectrum)> {
        alias_images(&self.spectrum, self.params.f_sample)
    }
}

/// Reconstruction MSE for each sample rate, in input order.
///
/// Each rate is independent, so the sweep runs on the rayon pool.
pub fn mse_sweep(f_sig: Hertz, rates: &[Hertz], t_view: Seconds) -> DspResult<Vec<(Hertz, f64)>> {
    rates
        .par_iter()
        .map(|&rate| {
            let params = SamplingParams::new(f_sig, rate).with_view(t_view);
            Reconstruction::compute(&params).map(|r| (rate, r.mse))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sinc_values() {
        assert_eq!(sinc(0.0), 1.0);
        assert!(sinc(1.0).abs() < 1e-15);
        assert!(sinc(-3.0).abs() < 1e-15);
        assert!((sinc(0.5) - 2.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn test_sample_window_is_wider_than_view() {
        let params = SamplingParams::new(Hertz(3.0), Hertz(8.0));
        let samples = generate_samples(&params);

        // T_generate = 3 s at dt = 0.125 s: n in [-12, 12]
        assert_eq!(samples.len(), 25);
        assert!((samples.t_start.0 + 1.5).abs() < 1e-12);
        assert!((samples.t_end().0 - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_reconstruction_exact_at_sample_instants() {
        let params = SamplingParams::new(Hertz(3.0), Hertz(7.0));
        let samples = generate_samples(&params);

        let rebuilt = reconstruct(&samples.times(), &samples).unwrap();
        for (i, (&s, &r)) in samples.samples.iter().zip(rebuilt.iter()).enumerate() {
            assert!((s - r).abs() < 1e-9, "Mismatch at sample {}: {} vs {}", i, s, r);
        }
    }

    #[test]
    fn test_mse_falls_with_sample_rate() {
        let f_sig = Hertz(3.0);
        let rates = [Hertz(4.0), Hertz(8.0), Hertz(16.0)];

        let sweep = mse_sweep(f_sig, &rates, DEFAULT_T_VIEW).unwrap();
        assert_eq!(sweep.len(), 3);
        assert_eq!(sweep[0].0, Hertz(4.0));

        assert!(sweep[0].1 > sweep[1].1);
        assert!(sweep[1].1 > sweep[2].1);
        assert!(sweep[2].1 < 1e-4, "well-sampled MSE too large: {}", sweep[2].1);
    }

    #[test]
    fn test_nyquist_flag() {
        assert!(SamplingParams::new(Hertz(3.0), Hertz(4.0)).is_undersampled());
        assert!(!SamplingParams::new(Hertz(3.0), Hertz(8.0)).is_undersampled());
    }

    #[test]
    fn test_zero_signal_spectrum_stays_zero() {
        let spectrum = magnitude_spectrum(&vec![0.0; 64], 0.01).unwrap();

        assert_eq!(spectrum.len(), 64);
        assert!(spectrum.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_spectrum_peaks_at_carrier() {
        let params = SamplingParams::new(Hertz(5.0), Hertz(20.0));
        let rec = Reconstruction::compute(&params).unwrap();

        assert!((rec.spectrum.peak() - 1.0).abs() < 1e-12);
        let peak = rec.spectrum.peak_frequency().unwrap();
        assert!((peak.0.abs() - 5.0).abs() <= 0.5, "peak at {} Hz", peak.0);

        // Zero frequency is centered
        let mid = rec.spectrum.frequencies[rec.spectrum.len() / 2];
        assert_eq!(mid, 0.0);
    }

    #[test]
    fn test_alias_images_at_sample_rate() {
        let params = SamplingParams::new(Hertz(5.0), Hertz(20.0));
        let rec = Reconstruction::compute(&params).unwrap();
        let images = rec.alias_images();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].0, -1);
        let shift = images[1].1.frequencies[0] - rec.spectrum.frequencies[0];
        assert!((shift - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = SamplingParams::new(Hertz(3.0), Hertz(0.0));
        assert!(matches!(Reconstruction::compute(&params), Err(DspError::InvalidConfig(_))));

        let params = SamplingParams::new(Hertz(3.0), Hertz(8.0)).with_view(Seconds(-1.0));
        assert!(Reconstruction::compute(&params).is_err());
    }

    #[test]
    fn test_mse_length_mismatch() {
        let result = mean_squared_error(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(DspError::LengthMismatch { expected: 2, actual: 1 })));
    }
}
