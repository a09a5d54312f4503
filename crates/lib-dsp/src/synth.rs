//! Signal synthesis for the seminar demonstrations.
//!
//! Everything here is a closed-form generator: constant pulses, ramp kernels,
//! the Gaussian-windowed cosine used for the sampling demo, and the angle
//! functions of the rotating fan.

use lib_types::signal::DiscreteSignal;
use lib_types::units::{Hertz, Seconds};
use std::f64::consts::PI;

/// Decay rate of the Gaussian envelope `exp(-ENVELOPE_DECAY * t^2)`.
pub const ENVELOPE_DECAY: f64 = 10.0;

/// `n` evenly spaced values from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    // Pin the last point so rounding never overshoots `stop`.
                    if i == n - 1 {
                        stop
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

/// A pulse of `n` ones.
pub fn constant_pulse(n: usize) -> DiscreteSignal {
    DiscreteSignal::new(vec![1.0; n])
}

/// A linearly decaying kernel of `n` taps from `start` to `stop`.
pub fn ramp_kernel(n: usize, start: f64, stop: f64) -> DiscreteSignal {
    DiscreteSignal::new(linspace(start, stop, n))
}

/// The seminar test signal `exp(-10 t^2) * cos(2 pi f t)`.
#[inline]
pub fn gaussian_cosine(t: f64, f_sig: Hertz) -> f64 {
    (-ENVELOPE_DECAY * t * t).exp() * (f_sig.angular() * t).cos()
}

/// Evaluate [`gaussian_cosine`] on every instant of `times`.
pub fn gaussian_cosine_at(times: &[f64], f_sig: Hertz) -> Vec<f64> {
    times.iter().map(|&t| gaussian_cosine(t, f_sig)).collect()
}

/// Angle of a blade rotating at `f_sig` revolutions per second.
#[inline]
pub fn fan_angle(t: Seconds, f_sig: Hertz) -> f64 {
    f_sig.angular() * t.0
}

/// Angles of `count` spokes spaced evenly around the hub, starting at `angle`.
pub fn spoke_angles(angle: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| angle + i as f64 * (2.0 * PI / count as f64))
        .collect()
}

/// The most recent sample instant at or before `t` (sample-and-hold).
#[inline]
pub fn sample_hold_time(t: Seconds, f_sample: Hertz) -> Seconds {
    let period = f_sample.to_period();
    Seconds((t.0 / period.0).floor() * period.0)
}

/// Sub-sample offsets spanning one exposure interval `[0, 1/f_sample]`.
pub fn aperture_offsets(f_sample: Hertz, steps: usize) -> Vec<Seconds> {
    linspace(0.0, f_sample.to_period().0, steps)
        .into_iter()
        .map(Seconds)
        .collect()
}

/// Frequency a sampled rotation appears to have after folding.
///
/// A rotation at `f_sig` observed at `f_sample` frames per second is
/// indistinguishable from one at `f_sig - k * f_sample` for the nearest `k`.
pub fn apparent_frequency(f_sig: Hertz, f_sample: Hertz) -> Hertz {
    let k = (f_sig.0 / f_sample.0).round();
    Hertz((f_sig.0 - k * f_sample.0).abs())
}
