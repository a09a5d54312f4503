//! Result output formatting and writing.

use crate::orchestrator::{DemoResults, SweepResult};
use anyhow::{Context, Result};
use lib_anim::animation::Animation;
use lib_anim::display::DisplayMode;
use lib_anim::html::render_html;
use lib_anim::svg::render_svg;
use std::io::Write;
use std::path::Path;

/// Write every result to `output_dir` in the given display mode.
pub fn write_results(results: &DemoResults, output_dir: &Path, mode: DisplayMode) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    for animation in &results.animations {
        write_animation(animation, output_dir, mode)?;
    }

    if let Some(sweep) = &results.sweep {
        write_sweep(sweep, output_dir, mode)?;
    }

    Ok(())
}

fn write_animation(animation: &Animation, output_dir: &Path, mode: DisplayMode) -> Result<()> {
    match mode {
        DisplayMode::JsHtml => {
            let path = output_dir.join(format!("{}.html", animation.name));
            std::fs::write(&path, render_html(animation)?)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {} frame player to {:?}", animation.len(), path);
        }
        DisplayMode::Svg => {
            let dir = output_dir.join(&animation.name);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create frame directory {:?}", dir))?;
            for (i, figure) in animation.frames.iter().enumerate() {
                let path = dir.join(format!("frame_{:04}.svg", i));
                std::fs::write(&path, render_svg(figure, &format!("f{}", i))?)
                    .with_context(|| format!("Failed to write {:?}", path))?;
            }
            tracing::info!("Wrote {} SVG frames to {:?}", animation.len(), dir);
        }
        DisplayMode::Json => {
            let path = output_dir.join(format!("{}.json", animation.name));
            let f = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {:?}", path))?;
            serde_json::to_writer(std::io::BufWriter::new(f), animation)?;
            tracing::info!("Wrote {} frames as JSON to {:?}", animation.len(), path);
        }
    }
    Ok(())
}

fn write_sweep(sweep: &SweepResult, output_dir: &Path, mode: DisplayMode) -> Result<()> {
    match mode {
        DisplayMode::Json => {
            let path = output_dir.join("sweep.json");
            let rows: Vec<_> = sweep
                .rows
                .iter()
                .map(|(rate, mse)| serde_json::json!({ "f_sample": rate.0, "mse": mse }))
                .collect();
            let json = serde_json::json!({ "f_sig": sweep.f_sig.0, "rows": rows });
            std::fs::write(&path, serde_json::to_string_pretty(&json)?)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote MSE sweep to {:?}", path);
        }
        DisplayMode::JsHtml | DisplayMode::Svg => {
            let path = output_dir.join("sweep.csv");
            let mut f = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {:?}", path))?;
            writeln!(f, "f_sample,mse,undersampled")?;
            for (rate, mse) in &sweep.rows {
                writeln!(f, "{},{:e},{}", rate.0, mse, is_undersampled(sweep, rate.0))?;
            }
            tracing::info!("Wrote MSE sweep to {:?}", path);
        }
    }
    Ok(())
}

fn is_undersampled(sweep: &SweepResult, rate: f64) -> bool {
    sweep.f_sig.0 > rate / 2.0
}

/// Print a summary to stdout.
pub fn print_results(results: &DemoResults) {
    println!("\n=== Seminar Results ===\n");

    for animation in &results.animations {
        println!(
            "  {:<14} {:>4} frame(s), {:.1} s at {:.1} ms/frame",
            animation.name,
            animation.len(),
            animation.duration().0,
            animation.interval.as_ms()
        );
    }

    if let Some(sweep) = &results.sweep {
        println!("\nReconstruction MSE for f_sig = {} Hz:", sweep.f_sig.0);
        println!("  {:>10}  {:>12}", "f_sample", "MSE");
        for (rate, mse) in &sweep.rows {
            let flag = if is_undersampled(sweep, rate.0) { "  (below Nyquist)" } else { "" };
            println!("  {:>10.2}  {:>12.3e}{}", rate.0, mse, flag);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::{Hertz, Seconds};
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seminar-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sweep() -> SweepResult {
        SweepResult {
            f_sig: Hertz(3.0),
            rows: vec![(Hertz(4.0), 0.2), (Hertz(16.0), 1e-4)],
        }
    }

    #[test]
    fn test_sweep_csv_written() {
        let dir = scratch_dir("csv");
        write_sweep(&sweep(), &dir, DisplayMode::Svg).unwrap();

        let csv = std::fs::read_to_string(dir.join("sweep.csv")).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "f_sample,mse,undersampled");
        assert!(lines[1].ends_with(",true"));
        assert!(lines[2].ends_with(",false"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sweep_write_errors_name_the_path() {
        let dir = scratch_dir("blocked");
        // Directories sitting where the files should go
        std::fs::create_dir_all(dir.join("sweep.csv")).unwrap();
        std::fs::create_dir_all(dir.join("sweep.json")).unwrap();

        let err = write_sweep(&sweep(), &dir, DisplayMode::JsHtml).unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to create"), "{}", err);
        assert!(format!("{}", err).contains("sweep.csv"));

        let err = write_sweep(&sweep(), &dir, DisplayMode::Json).unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to write"), "{}", err);
        assert!(format!("{}", err).contains("sweep.json"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_frame_directory_error_has_context() {
        let dir = scratch_dir("frames");
        // A plain file named like the frame directory
        std::fs::write(dir.join("sampling"), "").unwrap();

        let animation = Animation {
            name: "sampling".into(),
            interval: Seconds::ZERO,
            frames: Vec::new(),
        };
        let err = write_animation(&animation, &dir, DisplayMode::Svg).unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to create frame directory"), "{}", err);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
