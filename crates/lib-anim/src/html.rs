//! Self-contained HTML player for a recorded [`Animation`].
//!
//! Every frame is embedded as inline SVG; a small script shows one at a time
//! and offers play/pause, single stepping and a frame slider. Single-frame
//! animations are written without the controls.

use crate::animation::Animation;
use crate::display;
use crate::error::AnimResult;
use crate::svg::{escape, render_svg};
use std::fmt::Write;

const STYLE: &str = r#"body { font-family: sans-serif; margin: 1em; }
.frame { display: none; }
.frame.active { display: block; }
.controls { margin-top: 0.5em; display: flex; gap: 0.5em; align-items: center; }
.controls input[type=range] { flex: 1; max-width: 40em; }"#;

const SCRIPT: &str = r#"(function () {
  const frames = document.querySelectorAll('.frame');
  const slider = document.getElementById('slider');
  const label = document.getElementById('label');
  const play = document.getElementById('play');
  const interval = Number(document.body.dataset.interval);
  const loop = document.body.dataset.loop === 'true';
  let current = 0;
  let timer = null;

  function show(i) {
    frames[current].classList.remove('active');
    current = i;
    frames[current].classList.add('active');
    slider.value = current;
    label.textContent = (current + 1) + ' / ' + frames.length;
  }

  function tick() {
    if (current + 1 < frames.length) {
      show(current + 1);
    } else if (loop) {
      show(0);
    } else {
      stop();
    }
  }

  function start() {
    if (timer === null) {
      timer = setInterval(tick, interval);
      play.textContent = 'Pause';
    }
  }

  function stop() {
    if (timer !== null) {
      clearInterval(timer);
      timer = null;
    }
    play.textContent = 'Play';
  }

  play.addEventListener('click', function () { timer === null ? start() : stop(); });
  document.getElementById('prev').addEventListener('click', function () {
    stop();
    show((current + frames.length - 1) % frames.length);
  });
  document.getElementById('next').addEventListener('click', function () {
    stop();
    show((current + 1) % frames.length);
  });
  slider.addEventListener('input', function () { stop(); show(Number(slider.value)); });

  show(0);
  start();
})();"#;

/// Render `animation` as a complete HTML document.
pub fn render_html(animation: &Animation) -> AnimResult<String> {
    let settings = display::settings();
    let title = escape(&animation.name);
    let count = animation.len();

    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, r#"<html lang="en">"#)?;
    writeln!(out, r#"<head><meta charset="utf-8"><title>{}</title>"#, title)?;
    writeln!(out, "<style>\n{}\n</style></head>", STYLE)?;
    writeln!(
        out,
        r#"<body data-interval="{:.3}" data-loop="{}">"#,
        animation.interval.as_ms(),
        settings.loop_playback
    )?;

    for (i, figure) in animation.frames.iter().enumerate() {
        // A lone frame is always visible, with or without script
        let class = if count == 1 { "frame active" } else { "frame" };
        writeln!(out, r#"<div class="{}" data-index="{}">"#, class, i)?;
        out.push_str(&render_svg(figure, &format!("f{}", i))?);
        writeln!(out, "</div>")?;
    }

    if count > 1 {
        writeln!(
            out,
            r#"<div class="controls"><button id="prev">&lt;</button><button id="play">Play</button><button id="next">&gt;</button><input id="slider" type="range" min="0" max="{}" value="0"><span id="label"></span></div>"#,
            count - 1
        )?;
        writeln!(out, "<script>\n{}\n</script>", SCRIPT)?;
    }

    writeln!(out, "</body>\n</html>")?;
    tracing::debug!("HTML player for '{}': {} frames, {} bytes", animation.name, count, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Artist, Color, Figure, Marker};
    use lib_types::units::Seconds;

    fn animation(frames: usize) -> Animation {
        let frames = (0..frames)
            .map(|i| {
                let mut fig = Figure::new(1, 1, 4.0, 3.0);
                fig.axes[0].add(Artist::point(i as f64, 0.0, Marker::circle(Color::RED)));
                fig
            })
            .collect();
        Animation {
            name: "demo <1>".to_string(),
            interval: Seconds::from_ms(500.0),
            frames,
        }
    }

    #[test]
    fn test_one_svg_per_frame() {
        let html = render_html(&animation(4)).unwrap();
        assert_eq!(html.matches("<svg ").count(), 4);
        assert_eq!(html.matches(r#"class="frame""#).count(), 4);
        assert!(html.contains(r#"id="f3-ax0""#));
    }

    #[test]
    fn test_player_controls_and_timing() {
        let html = render_html(&animation(3)).unwrap();
        assert!(html.contains(r#"data-interval="500.000""#));
        assert!(html.contains(r#"max="2""#));
        assert!(html.contains("<script>"));
        assert!(html.contains("<title>demo &lt;1&gt;</title>"));
    }

    #[test]
    fn test_single_frame_has_no_player() {
        let html = render_html(&animation(1)).unwrap();
        assert!(html.contains(r#"class="frame active""#));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("id=\"slider\""));
    }
}
