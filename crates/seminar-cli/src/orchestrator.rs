//! Demonstration orchestration.

use crate::config::SeminarConfig;
use anyhow::{Context, Result};
use lib_anim::animation::Animation;
use lib_anim::scenes::{ConvolutionScene, FanScene, SamplingFigure};
use lib_dsp::convolution::{fold_linear, ConvolutionSetup};
use lib_dsp::reconstruction::mse_sweep;
use lib_types::units::Hertz;

/// Which demonstrations to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    Convolution,
    Antialiasing,
    Sampling,
    Sweep,
    All,
}

impl Demo {
    fn includes(self, other: Demo) -> bool {
        self == Demo::All || self == other
    }
}

/// Everything produced by one run.
#[derive(Debug, Default)]
pub struct DemoResults {
    /// Recorded animations, in run order.
    pub animations: Vec<Animation>,

    /// Reconstruction MSE per sample rate.
    pub sweep: Option<SweepResult>,
}

/// MSE table of a sweep.
#[derive(Clone, Debug)]
pub struct SweepResult {
    pub f_sig: Hertz,
    pub rows: Vec<(Hertz, f64)>,
}

/// Runs the configured demonstrations.
pub struct Orchestrator {
    config: SeminarConfig,
}

impl Orchestrator {
    pub fn new(config: SeminarConfig) -> Self {
        Self { config }
    }

    /// Run `demo` (or all of them) and collect the results.
    pub fn run(&self, demo: Demo) -> Result<DemoResults> {
        let mut results = DemoResults::default();

        if demo.includes(Demo::Convolution) {
            results.animations.push(self.run_convolution()?);
        }
        if demo.includes(Demo::Antialiasing) {
            results.animations.push(self.run_antialiasing()?);
        }
        if demo.includes(Demo::Sampling) {
            results.animations.push(self.run_sampling()?);
        }
        if demo.includes(Demo::Sweep) {
            results.sweep = Some(self.run_sweep()?);
        }

        tracing::info!("Finished {:?}: {} animation(s)", demo, results.animations.len());
        Ok(results)
    }

    fn run_convolution(&self) -> Result<Animation> {
        let c = &self.config.convolution;
        tracing::info!("Convolution demo: Nx={}, Nh={}, N={}", c.nx, c.nh, c.buffer);

        let setup = ConvolutionSetup::pulse_and_ramp(c.nx, c.nh, c.buffer)
            .context("Failed to prepare convolution signals")?;
        if setup.is_aliased() {
            tracing::info!(
                "Buffer N={} is shorter than {}: outputs {:?} receive wrapped terms",
                c.buffer,
                setup.linear_len(),
                setup.aliased_indices()
            );
        }
        let folded = fold_linear(setup.y_lin.as_slice(), c.buffer)?;
        let deviation = folded
            .iter()
            .zip(setup.y_circ.as_slice())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        tracing::debug!("Circular result vs. folded linear result: max deviation {:.3e}", deviation);

        Animation::record(&ConvolutionScene::new(setup)).context("Failed to record convolution demo")
    }

    fn run_antialiasing(&self) -> Result<Animation> {
        let p = self.config.antialiasing;
        tracing::info!(
            "Antialiasing demo: {} Hz fan at {} FPS for {} s",
            p.f_sig.0,
            p.f_sample.0,
            p.duration.0
        );
        Animation::record(&FanScene::new(p)).context("Failed to record antialiasing demo")
    }

    fn run_sampling(&self) -> Result<Animation> {
        let params = self.config.sampling.params();
        tracing::info!(
            "Sampling demo: {} Hz signal at {} Hz over {} s",
            params.f_sig.0,
            params.f_sample.0,
            params.t_view.0
        );

        let figure = SamplingFigure::new(&params).context("Failed to compute reconstruction")?;
        Animation::record(&figure).context("Failed to render sampling figure")
    }

    fn run_sweep(&self) -> Result<SweepResult> {
        let s = &self.config.sweep;
        tracing::info!("MSE sweep: {} Hz over {} rates", s.f_sig.0, s.rates.len());

        let rows = mse_sweep(s.f_sig, &s.rates(), s.t_view).context("MSE sweep failed")?;
        Ok(SweepResult { f_sig: s.f_sig, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SeminarConfig {
        let mut config = SeminarConfig::default();
        config.convolution.nx = 3;
        config.convolution.nh = 2;
        config.convolution.buffer = 2;
        config.antialiasing.duration = lib_types::units::Seconds(0.5);
        config.antialiasing.fps = 10.0;
        config.sweep.rates = vec![4.0, 16.0];
        config
    }

    #[test]
    fn test_single_demo() {
        let results = Orchestrator::new(small_config()).run(Demo::Convolution).unwrap();
        assert_eq!(results.animations.len(), 1);
        // Nx + Nh - 1 outputs plus two held frames
        assert_eq!(results.animations[0].len(), 6);
        assert!(results.sweep.is_none());
    }

    #[test]
    fn test_all_demos() {
        let results = Orchestrator::new(small_config()).run(Demo::All).unwrap();
        let names: Vec<_> = results.animations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["convolution", "antialiasing", "sampling"]);
        assert_eq!(results.animations[1].len(), 5);
        assert_eq!(results.animations[2].len(), 1);

        let sweep = results.sweep.unwrap();
        assert_eq!(sweep.rows.len(), 2);
        assert!(sweep.rows[0].1 > sweep.rows[1].1);
    }
}
