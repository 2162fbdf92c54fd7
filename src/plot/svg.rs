//! SVG activity plot via Plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{DecayConstants, Measurement};
use crate::error::{AppError, EXIT_NO_DATA};

pub const PLOT_TITLE: &str = "Rubidium-79 Activity Curve";

const SVG_SIZE: (u32, u32) = (1280, 720);

/// Draw the kept measurements with vertical error bars and the fitted curve
/// sampled `samples` times over `[0, max t]`.
pub fn write_activity_svg(
    path: &Path,
    data: &[Measurement],
    constants: &DecayConstants,
    samples: usize,
) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::new(EXIT_NO_DATA, "No measurements to plot."));
    }

    draw(path, data, constants, samples)
        .map_err(|e| AppError::usage(format!("Failed to render plot '{}': {e}", path.display())))?;

    log::info!("plot: wrote {} ({} points)", path.display(), data.len());
    Ok(())
}

fn draw(
    path: &Path,
    data: &[Measurement],
    constants: &DecayConstants,
    samples: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let t_max = data.iter().map(|m| m.time).fold(0.0_f64, f64::max);
    let t_max = if t_max > 0.0 { t_max } else { 1.0 };
    let curve = super::sample_curve(constants, 0.0, t_max, samples);

    let mut y_lo = 0.0_f64;
    let mut y_hi = f64::NEG_INFINITY;
    for m in data {
        y_lo = y_lo.min(m.activity - m.activity_uncertainty);
        y_hi = y_hi.max(m.activity + m.activity_uncertainty);
    }
    for &(_, a) in &curve {
        y_hi = y_hi.max(a);
    }
    if !(y_hi.is_finite() && y_hi > y_lo) {
        y_hi = y_lo + 1.0;
    }
    let y_hi = y_hi + 0.05 * (y_hi - y_lo);

    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(PLOT_TITLE, ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..t_max * 1.02, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("t (s)")
        .y_desc("A (Bq)")
        .y_label_formatter(&|v| format!("{v:.1e}"))
        .draw()?;

    chart
        .draw_series(data.iter().map(|m| {
            ErrorBar::new_vertical(
                m.time,
                m.activity - m.activity_uncertainty,
                m.activity,
                m.activity + m.activity_uncertainty,
                BLUE.filled(),
                6,
            )
        }))?
        .label("Measured activity")
        .legend(|(x, y)| Circle::new((x, y), 3, BLUE.filled()));

    chart
        .draw_series(LineSeries::new(curve, RED.stroke_width(2)))?
        .label("Fitted curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rubidium_activity;

    #[test]
    fn writes_svg_with_title() {
        let c = DecayConstants::new(0.005, 0.0005);
        let data: Vec<Measurement> = (1..=20)
            .map(|i| {
                let t = i as f64 * 300.0;
                let a = rubidium_activity(t, &c);
                Measurement::new(t, a, 0.05 * a)
            })
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.svg");
        write_activity_svg(&path, &data, &c, 200).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(PLOT_TITLE));
        assert!(svg.contains("Fitted curve"));
    }

    #[test]
    fn empty_data_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_activity_svg(&dir.path().join("x.svg"), &[], &DecayConstants::initial_guess(), 10)
            .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_DATA);
    }
}
