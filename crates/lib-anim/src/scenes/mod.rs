//! Render contexts for the three seminar demonstrations.

pub mod convolution;
pub mod fan;
pub mod sampling;

pub use convolution::ConvolutionScene;
pub use fan::{FanParams, FanScene};
pub use sampling::SamplingFigure;

/// Upper y-limit leaving 10% headroom over `max`.
pub(crate) fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}
