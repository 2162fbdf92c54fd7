//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - kept measurements: `o`
//! - rejected outliers: `x`
//! - fitted curve: `-` line

use crate::domain::{DecayConstants, Measurement};

/// Render kept/rejected measurements and the fitted curve over `[0, max t]`.
pub fn render_ascii_plot(
    kept: &[Measurement],
    rejected: &[Measurement],
    constants: &DecayConstants,
    width: usize,
    height: usize,
) -> String {
    let t_max = kept
        .iter()
        .chain(rejected)
        .map(|m| m.time)
        .fold(0.0_f64, f64::max);
    let t_max = if t_max > 0.0 { t_max } else { 1.0 };
    let curve = super::sample_curve(constants, 0.0, t_max, width.max(2) * 2);
    render_plot(kept, rejected, &curve, 0.0, t_max, width, height)
}

fn render_plot(
    kept: &[Measurement],
    rejected: &[Measurement],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (a_min, a_max) = activity_range(kept, rejected, curve).unwrap_or((0.0, 1.0));
    let (a_min, a_max) = pad_range(a_min, a_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it; kept points win over rejected ones.
    draw_curve(&mut grid, curve, t_min, t_max, a_min, a_max);
    for (points, ch) in [(rejected, 'x'), (kept, 'o')] {
        for m in points {
            let x = map_x(m.time, t_min, t_max, width);
            let y = map_y(m.activity, a_min, a_max, height);
            grid[y][x] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.0}, {t_max:.0}] s | A=[{a_min:.3e}, {a_max:.3e}] Bq\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str("o kept  x rejected  - fit\n");

    out
}

fn activity_range(kept: &[Measurement], rejected: &[Measurement], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_a = f64::INFINITY;
    let mut max_a = f64::NEG_INFINITY;

    for a in kept.iter().chain(rejected).map(|m| m.activity).chain(curve.iter().map(|&(_, a)| a)) {
        if a.is_finite() {
            min_a = min_a.min(a);
            max_a = max_a.max(a);
        }
    }

    if min_a.is_finite() && max_a.is_finite() && max_a > min_a {
        Some((min_a, max_a))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(a: f64, a_min: f64, a_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((a - a_min) / (a_max - a_min)).clamp(0.0, 1.0);
    // Highest activity on row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, a_min: f64, a_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, a) in curve {
        let x = map_x(t, t_min, t_max, width);
        let y = map_y(a, a_min, a_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, '-');
        } else {
            grid[y][x] = '-';
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
