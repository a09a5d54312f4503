//! Static three-panel figure for sinc reconstruction of a sampled pulse.
//!
//! Top: analog reference, reconstruction and the samples in view. Middle: the
//! pointwise reconstruction error. Bottom: the normalized spectrum with its
//! first images at `+/- f_sample` and the Nyquist band edges.

use crate::animation::Scene;
use crate::error::AnimResult;
use crate::figure::{Artist, Axes, Color, Figure, LegendLoc, Marker, StemStyle, Stroke};
use lib_dsp::reconstruction::{Reconstruction, SamplingParams};
use lib_types::units::Seconds;

/// Smallest half-height of the error panel.
const MIN_ERROR_LIMIT: f64 = 0.05;

/// Smallest half-width of the spectrum panel, in Hz.
const MIN_SPECTRUM_SPAN: f64 = 20.0;

/// The sampling demonstration as a single-frame scene.
#[derive(Clone, Debug)]
pub struct SamplingFigure {
    data: Reconstruction,
}

impl SamplingFigure {
    /// Compute the reconstruction for `params`.
    pub fn new(params: &SamplingParams) -> AnimResult<Self> {
        Ok(Self {
            data: Reconstruction::compute(params)?,
        })
    }

    pub fn from_reconstruction(data: Reconstruction) -> Self {
        Self { data }
    }

    #[inline]
    pub fn data(&self) -> &Reconstruction {
        &self.data
    }

    /// Render the figure once.
    pub fn render(&self) -> AnimResult<Figure> {
        let mut figure = self.layout();
        self.draw(&mut figure, ())?;
        Ok(figure)
    }

    fn draw_time_domain(&self, ax: &mut Axes) {
        let d = &self.data;
        let p = &d.params;
        let half = p.half_view().0;

        ax.add(
            Artist::line(
                d.analog_times.clone(),
                d.analog.clone(),
                Stroke::new(Color::BLACK).alpha(0.3).width(4.0),
            )
            .labeled("Original Analog"),
        );
        ax.add(
            Artist::line(
                d.analog_times.clone(),
                d.reconstructed.clone(),
                Stroke::new(Color::TAB_BLUE).width(2.0).dashed(),
            )
            .labeled("Reconstructed"),
        );

        // Samples outside the view still feed the reconstruction but are not drawn
        let (ts, vs): (Vec<f64>, Vec<f64>) = d.samples_in_view().into_iter().unzip();
        ax.add(
            Artist::stem(ts, vs, StemStyle::new(Color::BLACK, Marker::circle(Color::RED)))
                .labeled("Samples (View area)"),
        );

        let color = if p.is_undersampled() {
            Color::TAB_RED
        } else {
            Color::TAB_GREEN
        };
        ax.set_title_styled(
            format!(
                "Freq: {:.1} Hz | SampleRate: {:.1} Hz | MSE Error: {:.2e}",
                p.f_sig.0, p.f_sample.0, d.mse
            ),
            color,
            true,
            14.0,
        );
        ax.legend(LegendLoc::UpperRight);
        ax.set_xlim(-half, half);
        ax.grid(0.3);
    }

    fn draw_error(&self, ax: &mut Axes) {
        let d = &self.data;
        let half = d.params.half_view().0;

        ax.add(Artist::line(
            d.analog_times.clone(),
            d.error.clone(),
            Stroke::new(Color::TAB_RED).width(1.0),
        ));
        ax.add(Artist::fill(d.analog_times.clone(), d.error.clone(), Color::TAB_RED, 0.1));

        ax.set_ylabel("Error");
        ax.set_title_styled("Reconstruction Error (Difference)", Color::BLACK, false, 10.0);
        ax.grid(0.5);
        ax.set_xlim(-half, half);
        let limit = MIN_ERROR_LIMIT.max(d.max_abs_error() * 1.1);
        ax.set_ylim(-limit, limit);
    }

    fn draw_spectrum(&self, ax: &mut Axes) {
        let d = &self.data;
        let p = &d.params;

        ax.add(
            Artist::fill(
                d.spectrum.frequencies.clone(),
                d.spectrum.magnitudes.clone(),
                Color::GREEN,
                0.6,
            )
            .labeled("Spectrum"),
        );

        for (k, image) in d.alias_images() {
            let fill = Artist::fill(image.frequencies, image.magnitudes, Color::RED, 0.2);
            ax.add(if k == 1 { fill.labeled("Alias Image") } else { fill });
        }

        let nyquist = p.nyquist().0;
        let edge = Stroke::new(Color::BLUE).dashed();
        ax.add(Artist::vline(nyquist, edge).labeled("Nyquist (fs/2)"));
        ax.add(Artist::vline(-nyquist, edge));

        let span = MIN_SPECTRUM_SPAN.max(p.f_sample.0 * 1.5);
        ax.set_xlim(-span, span);
        ax.set_title_styled("Frequency Domain", Color::BLACK, false, 10.0);
        ax.legend(LegendLoc::UpperRight);
        ax.grid(0.3);
    }
}

impl Scene for SamplingFigure {
    type Frame = ();

    fn name(&self) -> &str {
        "sampling"
    }

    fn layout(&self) -> Figure {
        Figure::new(3, 1, 10.0, 10.0).with_height_ratios(&[2.0, 1.5, 1.5])
    }

    fn frames(&self) -> Vec<()> {
        vec![()]
    }

    fn interval(&self) -> Seconds {
        Seconds::ZERO
    }

    fn draw(&self, figure: &mut Figure, _frame: ()) -> AnimResult<()> {
        for ax in figure.axes.iter_mut() {
            ax.clear();
        }
        self.draw_time_domain(figure.axes_mut(0)?);
        self.draw_error(figure.axes_mut(1)?);
        self.draw_spectrum(figure.axes_mut(2)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnimError;
    use lib_dsp::DspError;
    use lib_types::units::Hertz;

    fn figure(f_sig: f64, f_sample: f64) -> Figure {
        SamplingFigure::new(&SamplingParams::new(Hertz(f_sig), Hertz(f_sample)))
            .unwrap()
            .render()
            .unwrap()
    }

    fn labels(ax: &Axes) -> Vec<&str> {
        ax.legend_entries().filter_map(Artist::label).collect()
    }

    #[test]
    fn test_title_color_tracks_nyquist() {
        let ok = figure(3.0, 16.0);
        let title = ok.axes[0].title.as_ref().unwrap();
        assert_eq!(title.color, Color::TAB_GREEN);
        assert!(title.bold);
        assert!(title.text.starts_with("Freq: 3.0 Hz | SampleRate: 16.0 Hz | MSE Error: "));

        let bad = figure(3.0, 4.0);
        assert_eq!(bad.axes[0].title.as_ref().unwrap().color, Color::TAB_RED);
    }

    #[test]
    fn test_only_view_samples_drawn() {
        let fig = figure(3.0, 8.0);
        let stems = fig.axes[0]
            .artists
            .iter()
            .find_map(|a| match a {
                Artist::Stem { xs, .. } => Some(xs.clone()),
                _ => None,
            })
            .unwrap();

        // dt = 0.125 over [-1, 1]
        assert_eq!(stems.len(), 17);
        assert!(stems.iter().all(|t| t.abs() <= 1.0));
    }

    #[test]
    fn test_error_panel_limits() {
        // Well sampled: error is tiny, so the floor applies
        let fig = figure(3.0, 64.0);
        assert_eq!(fig.axes[1].ylim, Some((-0.05, 0.05)));
        assert_eq!(fig.axes[1].ylabel.as_deref(), Some("Error"));

        let fig = figure(3.0, 4.0);
        let (lo, hi) = fig.axes[1].ylim.unwrap();
        assert!(hi > 0.05);
        assert_eq!(lo, -hi);
    }

    #[test]
    fn test_spectrum_panel() {
        let fig = figure(3.0, 16.0);
        let ax = &fig.axes[2];

        assert_eq!(labels(ax), vec!["Spectrum", "Alias Image", "Nyquist (fs/2)"]);
        assert_eq!(ax.xlim, Some((-24.0, 24.0)));
        let vlines: Vec<f64> = ax
            .artists
            .iter()
            .filter_map(|a| match a {
                Artist::VLine { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(vlines, vec![8.0, -8.0]);

        // Low rates keep the minimum span
        assert_eq!(figure(3.0, 4.0).axes[2].xlim, Some((-20.0, 20.0)));
    }

    #[test]
    fn test_layout() {
        let fig = figure(3.0, 16.0);
        assert_eq!(fig.grid.height_ratios, vec![2.0, 1.5, 1.5]);
        assert_eq!(fig.axes.len(), 3);
    }

    #[test]
    fn test_invalid_params_propagate() {
        let err = SamplingFigure::new(&SamplingParams::new(Hertz(3.0), Hertz(0.0))).unwrap_err();
        assert!(matches!(err, AnimError::Dsp(DspError::InvalidConfig(_))));
    }
}
