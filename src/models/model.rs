//! Rb-79 activity model for the Sr-79 → Rb-79 → Kr-79 decay chain.
//!
//! Starting from `N0` Sr-79 nuclei and no Rb-79, the daughter activity is
//!
//! ```text
//! A(t) = λr N(t) = λr N0 λs / (λr − λs) · (e^{−λs t} − e^{−λr t})
//! ```
//!
//! The fitter relies on two primitive operations, both implemented here:
//! - predict `A(t)` for given decay constants (residuals, plots)
//! - the Jacobian row `∂A/∂(λs, λr)` at a given time (LM steps)

use crate::domain::{DecayConstants, INITIAL_STRONTIUM_NUCLEI};
use crate::math::exp_difference;

/// Relative step for central-difference derivatives.
const DIFF_REL_STEP: f64 = 1e-6;

/// Floor on the absolute difference step (s⁻¹).
const DIFF_MIN_STEP: f64 = 1e-12;

/// Predicted Rb-79 activity (Bq) at time `t` (s).
pub fn rubidium_activity(t: f64, constants: &DecayConstants) -> f64 {
    let DecayConstants { strontium, rubidium } = *constants;
    rubidium * INITIAL_STRONTIUM_NUCLEI * strontium * exp_difference(strontium, rubidium, t)
}

/// Predict activity for every time in `times`.
pub fn predict_all(times: &[f64], constants: &DecayConstants) -> Vec<f64> {
    times.iter().map(|&t| rubidium_activity(t, constants)).collect()
}

/// Partial derivatives `[∂A/∂λs, ∂A/∂λr]` at time `t`, by central differences.
pub fn activity_gradient(t: f64, constants: &DecayConstants) -> [f64; 2] {
    let p = constants.to_array();
    let mut out = [0.0; 2];
    for (k, slot) in out.iter_mut().enumerate() {
        let h = (p[k].abs() * DIFF_REL_STEP).max(DIFF_MIN_STEP);
        let mut hi = p;
        let mut lo = p;
        hi[k] += h;
        lo[k] -= h;
        let a_hi = rubidium_activity(t, &DecayConstants::from_array(hi));
        let a_lo = rubidium_activity(t, &DecayConstants::from_array(lo));
        *slot = (a_hi - a_lo) / (2.0 * h);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_is_zero_at_start_and_positive_after() {
        let c = DecayConstants::new(0.005, 0.0005);
        assert_eq!(rubidium_activity(0.0, &c), 0.0);
        assert!(rubidium_activity(600.0, &c) > 0.0);
    }

    #[test]
    fn activity_is_symmetric_in_constants() {
        let a = DecayConstants::new(0.004, 0.0007);
        let b = DecayConstants::new(0.0007, 0.004);
        for &t in &[60.0, 900.0, 7200.0] {
            let (x, y) = (rubidium_activity(t, &a), rubidium_activity(t, &b));
            assert!((x - y).abs() <= 1e-12 * x.abs());
        }
    }

    #[test]
    fn activity_matches_closed_form() {
        let c = DecayConstants::new(0.005, 0.0005);
        let t = 3600.0;
        let expected = c.rubidium * INITIAL_STRONTIUM_NUCLEI * c.strontium / (c.rubidium - c.strontium)
            * ((-c.strontium * t).exp() - (-c.rubidium * t).exp());
        let got = rubidium_activity(t, &c);
        assert!((got - expected).abs() / expected < 1e-10);
    }

    #[test]
    fn gradient_matches_analytic_rubidium_derivative_at_long_times() {
        // For t ≫ 1/λs the activity tends to λr N0 λs/(λs − λr) e^{−λr t},
        // whose log-derivative in λr is 1/λr + 1/(λs − λr) − t.
        let c = DecayConstants::new(0.01, 0.0005);
        let t = 4000.0;
        let a = rubidium_activity(t, &c);
        let g = activity_gradient(t, &c);
        let expected = a * (1.0 / c.rubidium + 1.0 / (c.strontium - c.rubidium) - t);
        assert!((g[1] - expected).abs() / expected.abs() < 1e-4);
    }
}
