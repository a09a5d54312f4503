//! # lib-anim
//!
//! Frame rendering and animation for the DSP seminar demonstrations.
//!
//! - **Figure model**: grids of axes holding stems, lines, fills, spans and text
//! - **Scenes**: per-demo render contexts that redraw a figure for one frame
//! - **Animation driver**: records frames in order into a replayable [`Animation`]
//! - **Export**: SVG frames and a self-contained HTML player
//!
//! Display settings are process-wide and must be set explicitly with
//! [`display::init`] before exporting; see [`display`].

pub mod error;
pub mod figure;
pub mod display;
pub mod animation;
pub mod scenes;
pub mod svg;
pub mod html;

pub use error::{AnimError, AnimResult};
pub use figure::{Artist, Axes, Color, Figure};
pub use animation::{Animation, AnimationDriver, DriverState, Scene};
pub use scenes::{ConvolutionScene, FanParams, FanScene, SamplingFigure};
