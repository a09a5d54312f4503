//! Linear vs. circular convolution, one output sample per frame.
//!
//! Layout (2x2, left column twice as wide):
//!
//! ```text
//! +---------------------------+-------------------+
//! | x[k] and h[n-k]           | y_lin[0..=n]      |
//! +---------------------------+-------------------+
//! | x and h[(n-k) mod N]      | y_circ            |
//! +---------------------------+-------------------+
//! ```
//!
//! The circular output panel has two modes. While `n < N` it shows the buffer
//! filling up like the linear result. From `n >= N` on it shows the final
//! buffer and rings the slot `n mod N` that the wrapped tail lands on, so the
//! viewer sees that later terms change earlier outputs.
//!
//! Each column shares one x-range and one y-range. The circular panel sets
//! the range of its column, so the linear kernel panel spans `[-1, max(L, N)]`
//! and the linear result is scaled to the circular peak.

use super::headroom;
use crate::animation::Scene;
use crate::error::AnimResult;
use crate::figure::{Artist, Axes, Color, Figure, LegendLoc, Marker, StemStyle};
use lib_dsp::convolution::ConvolutionSetup;
use lib_types::units::Seconds;

const LINEAR_KERNEL: usize = 0;
const LINEAR_RESULT: usize = 1;
const CIRCULAR_KERNEL: usize = 2;
const CIRCULAR_RESULT: usize = 3;

/// Extra frames held after the last output sample.
pub const PAUSE_FRAMES: usize = 2;

/// Delay between frames.
pub const FRAME_INTERVAL_MS: f64 = 500.0;

/// Render context of the convolution demo.
#[derive(Clone, Debug)]
pub struct ConvolutionScene {
    setup: ConvolutionSetup,
}

impl ConvolutionScene {
    pub fn new(setup: ConvolutionSetup) -> Self {
        Self { setup }
    }

    /// The precomputed signals.
    pub fn setup(&self) -> &ConvolutionSetup {
        &self.setup
    }

    /// Upper x-limit shared by every panel.
    fn result_span(&self) -> f64 {
        self.setup.linear_len().max(self.setup.buffer_len()) as f64
    }

    /// Upper y-limit of the right column.
    fn result_top(&self) -> f64 {
        headroom(self.setup.y_circ.max())
    }

    fn draw_linear_kernel(&self, ax: &mut Axes, n: usize) {
        let s = &self.setup;
        let nh = s.h.len();

        ax.set_title(format!("Linear: Kernel shift h[n-k] (step n={})", n));
        ax.set_xlim(-1.0, self.result_span());
        ax.set_ylim(-0.1, 1.2);
        ax.grid(0.2);

        ax.add(
            Artist::stem(
                index_axis(0, s.x.len()),
                s.x.as_slice().to_vec(),
                StemStyle::new(Color::BLUE, Marker::circle(Color::BLUE)),
            )
            .labeled("x[k]"),
        );

        // h reversed, its last tap sitting on k = n
        let start = n as isize - nh as isize + 1;
        let kernel_xs: Vec<f64> = (0..nh).map(|i| (start + i as isize) as f64).collect();
        ax.add(
            Artist::stem(
                kernel_xs,
                s.h.reversed().as_slice().to_vec(),
                StemStyle::new(Color::RED, Marker::square(Color::RED)),
            )
            .labeled("h[n-k]"),
        );
        ax.legend(LegendLoc::UpperLeft);
    }

    fn draw_linear_result(&self, ax: &mut Axes, n: usize) {
        let s = &self.setup;

        ax.set_title(format!("Linear result y_lin[{}]", n));
        ax.set_xlim(-1.0, self.result_span());
        ax.set_ylim(-0.1, self.result_top());
        ax.grid(0.2);

        let limit = (n + 1).min(s.linear_len());
        ax.add(Artist::stem(
            index_axis(0, limit),
            s.y_lin.as_slice()[..limit].to_vec(),
            StemStyle::new(Color::GREEN, Marker::circle(Color::GREEN)).with_baseline(Color::BLACK),
        ));
    }

    fn draw_circular_kernel(&self, ax: &mut Axes, n: usize) {
        let s = &self.setup;
        let buffer_len = s.buffer_len();

        ax.set_title(format!("Circular: Rotation in buffer N={}", buffer_len));
        ax.set_xlim(-1.0, self.result_span());
        ax.set_ylim(-0.1, 1.2);
        ax.add(
            Artist::span(0.0, (buffer_len - 1) as f64, Color::GRAY, 0.1).labeled("Buffer boundary"),
        );

        ax.add(Artist::stem(
            index_axis(0, buffer_len),
            s.x_padded.as_slice().to_vec(),
            StemStyle::new(Color::BLUE, Marker::circle(Color::BLUE)),
        ));
        ax.add(Artist::stem(
            index_axis(0, buffer_len),
            s.h_padded.rotated(n % buffer_len),
            StemStyle::new(Color::RED, Marker::square(Color::RED)),
        ));

        if n >= buffer_len {
            ax.add(Artist::text(
                buffer_len as f64 / 2.0,
                1.05,
                "TAIL WRAPPED AROUND",
                Color::RED,
                true,
            ));
        }
    }

    fn draw_circular_result(&self, ax: &mut Axes, n: usize) {
        let s = &self.setup;
        let buffer_len = s.buffer_len();
        let style = StemStyle::new(Color::TAB_ORANGE, Marker::square(Color::TAB_ORANGE))
            .with_baseline(Color::BLACK);

        ax.set_title("Circular result y_circ");
        ax.set_xlim(-1.0, self.result_span());
        ax.set_ylim(-0.1, self.result_top());
        ax.grid(0.2);

        if n < buffer_len {
            // Still filling: show the outputs computed so far
            let limit = n + 1;
            ax.add(Artist::stem(
                index_axis(0, limit),
                s.y_circ.as_slice()[..limit].to_vec(),
                style,
            ));
        } else {
            // Wrapped: the whole final buffer, with the slot that just received the tail
            ax.add(Artist::stem(
                index_axis(0, buffer_len),
                s.y_circ.as_slice().to_vec(),
                style,
            ));
            let alias_idx = n % buffer_len;
            ax.add(Artist::point(
                alias_idx as f64,
                s.y_circ.as_slice()[alias_idx],
                Marker::ring(Color::RED, 12.0),
            ));
        }
    }
}

impl Scene for ConvolutionScene {
    type Frame = usize;

    fn name(&self) -> &str {
        "convolution"
    }

    fn layout(&self) -> Figure {
        Figure::new(2, 2, 12.0, 8.0).with_width_ratios(&[2.0, 1.0])
    }

    fn frames(&self) -> Vec<usize> {
        (0..self.setup.linear_len() + PAUSE_FRAMES).collect()
    }

    fn interval(&self) -> Seconds {
        Seconds::from_ms(FRAME_INTERVAL_MS)
    }

    fn draw(&self, figure: &mut Figure, n: usize) -> AnimResult<()> {
        for ax in figure.axes.iter_mut() {
            ax.clear();
        }

        self.draw_linear_kernel(figure.axes_mut(LINEAR_KERNEL)?, n);
        self.draw_linear_result(figure.axes_mut(LINEAR_RESULT)?, n);
        self.draw_circular_kernel(figure.axes_mut(CIRCULAR_KERNEL)?, n);
        self.draw_circular_result(figure.axes_mut(CIRCULAR_RESULT)?, n);
        Ok(())
    }
}

/// `[start, start + 1, ..., start + len - 1]` as plot coordinates.
fn index_axis(start: usize, len: usize) -> Vec<f64> {
    (start..start + len).map(|i| i as f64).collect()
}
