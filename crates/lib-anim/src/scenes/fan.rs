//! Temporal aliasing of a rotating three-blade fan.
//!
//! Three panels side by side: the true rotation, the same rotation seen by a
//! slow sample-and-hold camera, and the motion-blur composite a camera with an
//! exposure of one full frame period would record.

use crate::animation::Scene;
use crate::error::AnimResult;
use crate::figure::{Artist, Axes, Color, Figure, Stroke};
use lib_dsp::synth::{
    aperture_offsets, apparent_frequency, fan_angle, linspace, sample_hold_time, spoke_angles,
};
use lib_types::units::{Hertz, Seconds};
use serde::{Deserialize, Serialize};

/// Blades per fan.
pub const SPOKES: usize = 3;

const SPOKE_WIDTH: f64 = 10.0;
const LIMIT: f64 = 1.2;

/// Parameters of the fan demo.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanParams {
    /// Rotation rate in revolutions per second.
    pub f_sig: Hertz,
    /// Camera frame rate.
    pub f_sample: Hertz,
    /// Length of the animation.
    pub duration: Seconds,
    /// Display frame rate of the animation itself.
    pub fps: f64,
    /// Sub-exposures averaged into the blur panel.
    pub blur_steps: usize,
}

impl Default for FanParams {
    fn default() -> Self {
        Self {
            f_sig: Hertz(2.2),
            f_sample: Hertz(2.0),
            duration: Seconds(10.0),
            fps: 60.0,
            blur_steps: 15,
        }
    }
}

/// Render context of the fan demo.
#[derive(Clone, Debug)]
pub struct FanScene {
    params: FanParams,
    apparent: Hertz,
    offsets: Vec<Seconds>,
}

impl FanScene {
    pub fn new(params: FanParams) -> Self {
        let apparent = apparent_frequency(params.f_sig, params.f_sample);
        tracing::debug!(
            "Fan: {} Hz observed at {} FPS appears at {:.3} Hz",
            params.f_sig.0,
            params.f_sample.0,
            apparent.0
        );
        Self {
            params,
            apparent,
            offsets: aperture_offsets(params.f_sample, params.blur_steps),
        }
    }

    #[inline]
    pub fn params(&self) -> &FanParams {
        &self.params
    }

    /// Folded rotation rate shown in the sampled panel.
    #[inline]
    pub fn apparent_frequency(&self) -> Hertz {
        self.apparent
    }

    fn draw_spokes(ax: &mut Axes, angle: f64, stroke: Stroke) {
        for theta in spoke_angles(angle, SPOKES) {
            ax.add(Artist::line(
                vec![0.0, theta.cos()],
                vec![0.0, theta.sin()],
                stroke,
            ));
        }
    }
}

fn prepare(ax: &mut Axes, title: String) {
    ax.clear();
    ax.set_xlim(-LIMIT, LIMIT);
    ax.set_ylim(-LIMIT, LIMIT);
    ax.set_aspect_equal();
    ax.hide_ticks();
    ax.set_title(title);
}

fn spoke_stroke() -> Stroke {
    Stroke::new(Color::RED).width(SPOKE_WIDTH).round_cap()
}

impl Scene for FanScene {
    type Frame = Seconds;

    fn name(&self) -> &str {
        "antialiasing"
    }

    fn layout(&self) -> Figure {
        Figure::new(1, 3, 10.0, 5.0)
    }

    fn frames(&self) -> Vec<Seconds> {
        let count = (self.params.duration.0 * self.params.fps).floor() as usize;
        linspace(0.0, self.params.duration.0, count)
            .into_iter()
            .map(Seconds)
            .collect()
    }

    fn interval(&self) -> Seconds {
        Seconds::from_ms(1000.0 / self.params.fps)
    }

    fn draw(&self, figure: &mut Figure, t: Seconds) -> AnimResult<()> {
        let p = &self.params;
        let t_sample = sample_hold_time(t, p.f_sample);

        let ax = figure.axes_mut(0)?;
        prepare(ax, format!("Original: {} Hz", p.f_sig.0));
        Self::draw_spokes(ax, fan_angle(t, p.f_sig), spoke_stroke());

        let ax = figure.axes_mut(1)?;
        prepare(
            ax,
            format!(
                "Sampled: {} FPS\nApparent frequency: {:.1} Hz",
                p.f_sample.0, self.apparent.0
            ),
        );
        Self::draw_spokes(ax, fan_angle(t_sample, p.f_sig), spoke_stroke());

        // One faint copy per sub-exposure; overlaps build up the blur
        let ax = figure.axes_mut(2)?;
        prepare(ax, "Aperture effect".to_string());
        let faint = spoke_stroke().alpha(LIMIT / p.blur_steps.max(1) as f64);
        for &offset in &self.offsets {
            Self::draw_spokes(ax, fan_angle(t_sample + offset, p.f_sig), faint);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(ax: &Axes) -> Vec<(f64, f64, f64)> {
        ax.artists
            .iter()
            .map(|a| match a {
                Artist::Line { xs, ys, stroke, .. } => {
                    assert_eq!((xs[0], ys[0]), (0.0, 0.0));
                    (xs[1], ys[1], stroke.alpha)
                }
                other => panic!("expected line, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_frame_times() {
        let scene = FanScene::new(FanParams::default());
        let frames = scene.frames();

        assert_eq!(frames.len(), 600);
        assert_eq!(frames[0], Seconds(0.0));
        assert_eq!(frames[599], Seconds(10.0));
        assert!((scene.interval().as_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_apparent_frequency() {
        let scene = FanScene::new(FanParams::default());
        assert!((scene.apparent_frequency().0 - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_panels_and_titles() {
        let scene = FanScene::new(FanParams::default());
        let mut fig = scene.layout();
        scene.draw(&mut fig, Seconds(0.3)).unwrap();

        let titles: Vec<_> = fig
            .axes
            .iter()
            .map(|ax| ax.title.as_ref().unwrap().text.clone())
            .collect();
        assert_eq!(titles[0], "Original: 2.2 Hz");
        assert_eq!(titles[1], "Sampled: 2 FPS\nApparent frequency: 0.2 Hz");
        assert_eq!(titles[2], "Aperture effect");

        for ax in &fig.axes {
            assert!(ax.equal_aspect && ax.hide_ticks);
            assert_eq!(ax.xlim, Some((-1.2, 1.2)));
            assert_eq!(ax.ylim, Some((-1.2, 1.2)));
        }
    }

    #[test]
    fn test_sampled_fan_holds_between_frames() {
        let scene = FanScene::new(FanParams::default());
        let mut a = scene.layout();
        let mut b = scene.layout();
        // Both instants fall in the hold interval [0.5, 1.0)
        scene.draw(&mut a, Seconds(0.55)).unwrap();
        scene.draw(&mut b, Seconds(0.95)).unwrap();

        assert_eq!(a.axes[1], b.axes[1]);
        assert_ne!(a.axes[0], b.axes[0]);
    }

    #[test]
    fn test_spokes_evenly_spaced_on_unit_circle() {
        let scene = FanScene::new(FanParams::default());
        let mut fig = scene.layout();
        scene.draw(&mut fig, Seconds(0.0)).unwrap();

        let spokes = lines(&fig.axes[0]);
        assert_eq!(spokes.len(), SPOKES);
        for (x, y, alpha) in &spokes {
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-12);
            assert_eq!(*alpha, 1.0);
        }
        assert!((spokes[0].0 - 1.0).abs() < 1e-12);
        assert!((spokes[1].0 + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_blur_composite() {
        let scene = FanScene::new(FanParams::default());
        let mut fig = scene.layout();
        scene.draw(&mut fig, Seconds(1.2)).unwrap();

        let blur = lines(&fig.axes[2]);
        assert_eq!(blur.len(), 3 * 15);
        assert!(blur.iter().all(|&(_, _, alpha)| (alpha - 1.2 / 15.0).abs() < 1e-12));
    }

    #[test]
    fn test_params_partial_json() {
        let params: FanParams = serde_json::from_str(r#"{"f_sig": 3.0}"#).unwrap();
        assert_eq!(params.f_sig, Hertz(3.0));
        assert_eq!(params.blur_steps, 15);
    }
}
