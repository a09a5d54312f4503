//! Seminar configuration loading and validation.

use anyhow::{Context, Result};
use lib_anim::display::DisplaySettings;
use lib_anim::scenes::FanParams;
use lib_dsp::reconstruction::{SamplingParams, DEFAULT_ANALOG_RES, DEFAULT_T_VIEW};
use lib_types::units::{Hertz, Seconds};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration: one section per demonstration.
///
/// Every section and field is optional; missing values take the seminar
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeminarConfig {
    /// How recorded animations are exported.
    pub display: DisplaySettings,

    /// Linear vs. circular convolution.
    pub convolution: ConvolutionConfig,

    /// Rotating fan and aperture effect.
    pub antialiasing: FanParams,

    /// Sinc reconstruction figure.
    pub sampling: SamplingConfig,

    /// Reconstruction error over several sample rates.
    pub sweep: SweepConfig,
}

/// Sizes for the convolution demo.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvolutionConfig {
    /// Length of the constant input pulse.
    pub nx: usize,
    /// Length of the ramp kernel.
    pub nh: usize,
    /// Circular buffer length N.
    pub buffer: usize,
}

impl Default for ConvolutionConfig {
    fn default() -> Self {
        Self {
            nx: 10,
            nh: 10,
            buffer: 10,
        }
    }
}

/// Parameters of the sampling figure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub f_sig: Hertz,
    pub f_sample: Hertz,
    pub t_view: Seconds,
    /// Points on the analog reference grid.
    pub analog_res: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            f_sig: Hertz(3.0),
            f_sample: Hertz(8.0),
            t_view: DEFAULT_T_VIEW,
            analog_res: DEFAULT_ANALOG_RES,
        }
    }
}

impl SamplingConfig {
    pub fn params(&self) -> SamplingParams {
        SamplingParams {
            analog_res: self.analog_res,
            ..SamplingParams::new(self.f_sig, self.f_sample).with_view(self.t_view)
        }
    }
}

/// Sample rates to compare for one signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub f_sig: Hertz,
    /// Sample rates in Hz.
    pub rates: Vec<f64>,
    pub t_view: Seconds,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            f_sig: Hertz(3.0),
            rates: vec![2.0, 4.0, 6.0, 8.0, 12.0, 16.0, 24.0, 32.0],
            t_view: DEFAULT_T_VIEW,
        }
    }
}

impl SweepConfig {
    pub fn rates(&self) -> Vec<Hertz> {
        self.rates.iter().copied().map(Hertz).collect()
    }
}

/// Load configuration from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<SeminarConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: SeminarConfig = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| "Failed to parse config as JSON")?
    } else {
        toml::from_str(&content)
            .with_context(|| "Failed to parse config as TOML")?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Check that every section describes a demonstration that can be rendered.
pub fn validate_config(config: &SeminarConfig) -> Result<()> {
    let conv = &config.convolution;
    if conv.nx == 0 || conv.nh == 0 || conv.buffer == 0 {
        anyhow::bail!(
            "Convolution sizes must be positive (got nx={}, nh={}, buffer={})",
            conv.nx,
            conv.nh,
            conv.buffer
        );
    }

    let fan = &config.antialiasing;
    if !(fan.f_sample.0 > 0.0) {
        anyhow::bail!("Camera frame rate must be positive, got {}", fan.f_sample.0);
    }
    if !(fan.fps > 0.0) || !(fan.duration.0 > 0.0) {
        anyhow::bail!(
            "Animation duration and fps must be positive (got {} s at {} fps)",
            fan.duration.0,
            fan.fps
        );
    }
    if fan.blur_steps == 0 {
        anyhow::bail!("blur_steps must be at least 1");
    }

    config
        .sampling
        .params()
        .validate()
        .context("Invalid [sampling] section")?;

    let sweep = &config.sweep;
    if sweep.rates.is_empty() {
        anyhow::bail!("[sweep] needs at least one sample rate");
    }
    for rate in sweep.rates() {
        SamplingParams::new(sweep.f_sig, rate)
            .with_view(sweep.t_view)
            .validate()
            .context("Invalid [sweep] section")?;
    }

    if !(config.display.dpi > 0.0) {
        anyhow::bail!("Display dpi must be positive, got {}", config.display.dpi);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_anim::display::DisplayMode;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SeminarConfig = toml::from_str("").unwrap();
        assert_eq!(config, SeminarConfig::default());
        assert_eq!(config.convolution.buffer, 10);
        assert_eq!(config.antialiasing.blur_steps, 15);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: SeminarConfig = toml::from_str(
            r#"
            [display]
            mode = "svg"

            [convolution]
            buffer = 6

            [sampling]
            f_sig = 5.0
            f_sample = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.display.mode, DisplayMode::Svg);
        assert_eq!(config.display.dpi, 100.0);
        assert_eq!(config.convolution.nx, 10);
        assert_eq!(config.convolution.buffer, 6);
        assert_eq!(config.sampling.params().f_sig, Hertz(5.0));
        assert_eq!(config.sampling.params().analog_res, DEFAULT_ANALOG_RES);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config: SeminarConfig = toml::from_str(include_str!("../../../seminar.toml")).unwrap();
        assert_eq!(config, SeminarConfig::default());
    }

    #[test]
    fn test_json_config() {
        let config: SeminarConfig =
            serde_json::from_str(r#"{"sweep": {"f_sig": 2.0, "rates": [3.0, 5.0]}}"#).unwrap();
        assert_eq!(config.sweep.rates(), vec![Hertz(3.0), Hertz(5.0)]);
        assert_eq!(config.sweep.t_view, DEFAULT_T_VIEW);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SeminarConfig::default();
        config.convolution.buffer = 0;
        assert!(validate_config(&config).is_err());

        let mut config = SeminarConfig::default();
        config.sweep.rates = vec![8.0, 0.0];
        assert!(validate_config(&config).is_err());

        let mut config = SeminarConfig::default();
        config.antialiasing.blur_steps = 0;
        assert!(validate_config(&config).is_err());
    }
}
