//! Frame-by-frame animation recording.
//!
//! A [`Scene`] is a render context: it owns every precomputed array of one
//! demonstration and knows how to redraw a [`Figure`] for a given frame. The
//! [`AnimationDriver`] walks the scene's frame sequence strictly in order and
//! snapshots the figure after each draw, producing a replayable [`Animation`].
//!
//! Driver states:
//!
//! ```text
//! NotStarted --step--> Rendering(0) --step--> ... Rendering(n-1) --step--> Finished
//! ```
//!
//! Any error from [`Scene::draw`] aborts the recording.

use crate::error::{AnimError, AnimResult};
use crate::figure::Figure;
use lib_types::units::Seconds;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A demonstration that can be drawn frame by frame.
pub trait Scene {
    /// Frame key: an index for discrete demos, a time for continuous ones.
    type Frame: Copy + Debug;

    /// Short name used for titles and file names.
    fn name(&self) -> &str;

    /// Blank figure with the scene's layout.
    fn layout(&self) -> Figure;

    /// Frame keys in the order they must be drawn.
    fn frames(&self) -> Vec<Self::Frame>;

    /// Nominal time between frames.
    fn interval(&self) -> Seconds;

    /// Redraw `figure` for `frame`. Must fully redraw every axes it uses.
    fn draw(&self, figure: &mut Figure, frame: Self::Frame) -> AnimResult<()>;
}

/// Where the driver is in the frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    Rendering(usize),
    Finished,
}

/// Steps a scene through its frames, one draw per step.
pub struct AnimationDriver<'s, S: Scene> {
    scene: &'s S,
    frames: Vec<S::Frame>,
    figure: Figure,
    state: DriverState,
}

impl<'s, S: Scene> AnimationDriver<'s, S> {
    /// Prepare to drive `scene`. Fails if the scene has no frames.
    pub fn new(scene: &'s S) -> AnimResult<Self> {
        let frames = scene.frames();
        if frames.is_empty() {
            return Err(AnimError::NoFrames);
        }
        Ok(Self {
            scene,
            frames,
            figure: scene.layout(),
            state: DriverState::NotStarted,
        })
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Number of frames in the sequence.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Draw the next frame and return the figure, or `None` once finished.
    pub fn step(&mut self) -> AnimResult<Option<&Figure>> {
        let next = match self.state {
            DriverState::NotStarted => 0,
            DriverState::Rendering(n) => n + 1,
            DriverState::Finished => return Ok(None),
        };

        if next >= self.frames.len() {
            self.state = DriverState::Finished;
            return Ok(None);
        }

        let frame = self.frames[next];
        tracing::trace!("{}: drawing frame {} ({:?})", self.scene.name(), next, frame);
        self.scene.draw(&mut self.figure, frame)?;
        self.state = DriverState::Rendering(next);
        Ok(Some(&self.figure))
    }
}

/// A recorded animation: figure snapshots plus playback interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub interval: Seconds,
    pub frames: Vec<Figure>,
}

impl Animation {
    /// Drive `scene` to completion and keep every frame.
    pub fn record<S: Scene>(scene: &S) -> AnimResult<Self> {
        let mut driver = AnimationDriver::new(scene)?;
        let mut frames = Vec::with_capacity(driver.frame_count());

        while let Some(figure) = driver.step()? {
            frames.push(figure.clone());
        }

        tracing::info!(
            "Recorded '{}': {} frames at {:.1} ms",
            scene.name(),
            frames.len(),
            scene.interval().as_ms()
        );

        Ok(Self {
            name: scene.name().to_string(),
            interval: scene.interval(),
            frames,
        })
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the animation has no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Playback length at the nominal interval.
    pub fn duration(&self) -> Seconds {
        self.interval * self.frames.len() as f64
    }

    /// Frame `index`, if recorded.
    pub fn frame(&self, index: usize) -> Option<&Figure> {
        self.frames.get(index)
    }
}
