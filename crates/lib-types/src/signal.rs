//! Discrete signals, uniformly sampled signals and centered spectra.
//!
//! # Sample Semantics
//!
//! Samples in a [`SampledSignal`] are **point measurements** at discrete instants.
//! For a signal with `N` samples the sample times are:
//!
//! ```text
//! t[i] = t_start + i * dt,  for i = 0, 1, ..., N-1
//! ```
//!
//! A [`DiscreteSignal`] carries no time axis at all; its samples are addressed by
//! index only, the way x[n] and h[n] are written on the blackboard.

use crate::units::{Hertz, Seconds};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An immutable, index-addressed real sequence (x[n], h[n], y[n]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteSignal {
    samples: Vec<f64>,
}

impl DiscreteSignal {
    /// Wrap a vector of samples. The signal is read-only from here on.
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the signal is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the samples.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// The samples in reverse order (h[-k] shifted so it starts at 0).
    pub fn reversed(&self) -> Self {
        Self {
            samples: self.samples.iter().rev().copied().collect(),
        }
    }
}

impl Index<usize> for DiscreteSignal {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.samples[index]
    }
}

impl From<Vec<f64>> for DiscreteSignal {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

/// A uniformly-sampled time-domain signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampledSignal {
    /// Sample values.
    pub samples: Vec<f64>,

    /// Time step between consecutive samples.
    pub dt: Seconds,

    /// Time of the first sample (negative for windows centered on zero).
    pub t_start: Seconds,
}

impl SampledSignal {
    /// Create a new sampled signal.
    pub fn new(samples: Vec<f64>, dt: Seconds, t_start: Seconds) -> Self {
        Self { samples, dt, t_start }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the signal is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the time value for a given sample index.
    #[inline]
    pub fn time_at(&self, index: usize) -> Seconds {
        Seconds(self.t_start.0 + index as f64 * self.dt.0)
    }

    /// All sample instants, in order.
    pub fn times(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| self.time_at(i).0).collect()
    }

    /// Time of the last sample; `t_start` if empty.
    #[inline]
    pub fn t_end(&self) -> Seconds {
        if self.samples.is_empty() {
            return self.t_start;
        }
        self.time_at(self.samples.len() - 1)
    }

    /// Samples whose instants fall inside `[t_min, t_max]`, as `(t, value)` pairs.
    pub fn within(&self, t_min: Seconds, t_max: Seconds) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.time_at(i).0, v))
            .filter(|&(t, _)| t >= t_min.0 && t <= t_max.0)
            .collect()
    }
}

/// A frequency-centered magnitude spectrum (zero frequency in the middle).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending.
    pub frequencies: Vec<f64>,

    /// Bin magnitudes; unit peak once normalized.
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Create a spectrum from matching frequency and magnitude vectors.
    pub fn new(frequencies: Vec<f64>, magnitudes: Vec<f64>) -> Self {
        Self { frequencies, magnitudes }
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// Check if the spectrum is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Largest magnitude.
    pub fn peak(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }

    /// Frequency of the largest magnitude, if any bin exists.
    pub fn peak_frequency(&self) -> Option<Hertz> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| Hertz(self.frequencies[i]))
    }

    /// Scale to unit peak. A spectrum whose peak is zero is left untouched.
    pub fn normalize(&mut self) {
        let peak = self.peak();
        if peak > 0.0 {
            for m in &mut self.magnitudes {
                *m /= peak;
            }
        }
    }

    /// The same magnitudes translated along the frequency axis by `offset`.
    pub fn shifted(&self, offset: Hertz) -> Self {
        Self {
            frequencies: self.frequencies.iter().map(|f| f + offset.0).collect(),
            magnitudes: self.magnitudes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_signal_reversed() {
        let h = DiscreteSignal::new(vec![1.0, 0.5, 0.25]);

        assert_eq!(h.reversed().as_slice(), &[0.25, 0.5, 1.0]);
        assert_eq!(h.reversed()[0], 0.25);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_sampled_signal_times() {
        let s = SampledSignal::new(vec![0.0; 5], Seconds(0.5), Seconds(-1.0));

        assert_eq!(s.times(), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(s.t_end(), Seconds(1.0));
        assert_eq!(s.within(Seconds(-0.5), Seconds(0.5)).len(), 3);
    }

    #[test]
    fn test_spectrum_normalize_zero_peak_is_noop() {
        let mut spectrum = Spectrum::new(vec![-1.0, 0.0, 1.0], vec![0.0; 3]);
        spectrum.normalize();

        assert!(spectrum.magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_spectrum_shift_and_peak() {
        let mut spectrum = Spectrum::new(vec![-1.0, 0.0, 1.0], vec![1.0, 4.0, 2.0]);
        spectrum.normalize();

        assert_eq!(spectrum.magnitudes, vec![0.25, 1.0, 0.5]);
        assert_eq!(spectrum.peak_frequency(), Some(Hertz(0.0)));

        let image = spectrum.shifted(Hertz(10.0));
        assert_eq!(image.frequencies, vec![9.0, 10.0, 11.0]);
        assert_eq!(image.magnitudes, spectrum.magnitudes);
    }
}
