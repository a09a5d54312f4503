//! # lib-dsp
//!
//! Numeric core of the DSP seminar demonstrations.
//!
//! - **Synthesis**: pulses, ramp kernels, Gaussian-windowed cosines, fan angles
//! - **FFT/IFFT**: cached rustfft planners, `fftfreq`/`fftshift`
//! - **Convolution**: direct linear convolution and FFT-based circular convolution
//! - **Reconstruction**: sinc interpolation, reconstruction error, centered spectra
//!   and alias images

pub mod error;
pub mod synth;
pub mod fft;
pub mod convolution;
pub mod reconstruction;

pub use error::{DspError, DspResult};
pub use fft::FftEngine;
pub use convolution::{CircularBuffer, CircularConvolver, ConvolutionSetup};
pub use reconstruction::{mse_sweep, Reconstruction, SamplingParams};
