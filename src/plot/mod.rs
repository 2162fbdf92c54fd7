//! Plot rendering for the decay fit.
//!
//! - `svg`: the publication image (error bars, fitted curve, legend)
//! - `ascii`: a quick terminal sanity check

use rayon::prelude::*;

use crate::domain::DecayConstants;
use crate::models::rubidium_activity;

pub mod ascii;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::{PLOT_TITLE, write_activity_svg};

/// Evaluate the fitted activity at `n` evenly spaced times over `[t_min, t_max]`.
pub fn sample_curve(constants: &DecayConstants, t_min: f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let step = (t_max - t_min) / (n as f64 - 1.0);
    (0..n)
        .into_par_iter()
        .map(|i| {
            let t = t_min + i as f64 * step;
            (t, rubidium_activity(t, constants))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_is_ordered_and_spans_range() {
        let c = DecayConstants::new(0.005, 0.0005);
        let curve = sample_curve(&c, 0.0, 1000.0, 101);
        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0], (0.0, 0.0));
        assert!((curve[100].0 - 1000.0).abs() < 1e-9);
        assert!(curve.windows(2).all(|w| w[1].0 > w[0].0));
        assert!((curve[37].1 - rubidium_activity(370.0, &c)).abs() <= 1e-9 * curve[37].1);
    }
}
