//! Process-wide display settings.
//!
//! How animations are presented (an embedded HTML player, loose SVG frames or a
//! JSON document) and the raster scale used for figure sizes are global to the
//! process. They are set once, explicitly, by the program entry point via
//! [`init`]; library code reads them with [`settings`] and falls back to the
//! defaults when nothing was initialized (as in unit tests).

use crate::error::{AnimError, AnimResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static SETTINGS: OnceLock<DisplaySettings> = OnceLock::new();

/// Presentation of a recorded animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Self-contained HTML page with a JavaScript frame player.
    #[default]
    JsHtml,
    /// One SVG file per frame.
    Svg,
    /// The figure snapshots as JSON.
    Json,
}

/// Global display configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub mode: DisplayMode,
    /// Pixels per inch of figure size.
    pub dpi: f64,
    /// Whether the HTML player starts over after the last frame.
    pub loop_playback: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            mode: DisplayMode::JsHtml,
            dpi: 100.0,
            loop_playback: true,
        }
    }
}

/// Install the display settings. May be called once per process.
pub fn init(settings: DisplaySettings) -> AnimResult<()> {
    SETTINGS
        .set(settings)
        .map_err(|_| AnimError::DisplayAlreadyInitialized)?;
    tracing::debug!("Display initialized: {:?}", settings);
    Ok(())
}

/// Current display settings, or the defaults when [`init`] was never called.
pub fn settings() -> DisplaySettings {
    SETTINGS.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_jshtml() {
        let defaults = DisplaySettings::default();
        assert_eq!(defaults.mode, DisplayMode::JsHtml);
        assert_eq!(defaults.dpi, 100.0);
    }

    #[test]
    fn test_init_only_once() {
        // The only test in this crate that touches the global
        let settings = DisplaySettings {
            mode: DisplayMode::Svg,
            ..Default::default()
        };
        assert!(init(settings).is_ok());
        assert_eq!(super::settings().mode, DisplayMode::Svg);
        assert!(matches!(init(settings), Err(AnimError::DisplayAlreadyInitialized)));
    }
}
