//! Stable exponential helpers for the decay-chain model.
//!
//! The Bateman solution for a two-member chain contains the difference
//!
//! ```text
//! (e^{-a t} - e^{-b t}) / (b - a)
//! ```
//!
//! which cancels catastrophically when `a ≈ b`. Factoring out `t e^{-a t}`
//! (with `a <= b`) leaves `g(x) = (1 - e^{-x}) / x` with `x = (b - a) t >= 0`,
//! which we evaluate via `expm1` (and a series near zero).

/// Threshold below which we switch to a small-x series approximation.
const SMALL_X: f64 = 1e-6;

/// Compute `g(x) = (1 - e^{-x}) / x` for `x >= 0`; `g(0) = 1`.
pub fn exp_ratio(x: f64) -> f64 {
    if x.abs() < SMALL_X {
        // Series: (1 - e^{-x}) / x ≈ 1 - x/2 + x^2/6
        return 1.0 - x / 2.0 + (x * x) / 6.0;
    }

    // 1 - exp(-x) computed as -expm1(-x).
    -(-x).exp_m1() / x
}

/// Compute `(e^{-a t} - e^{-b t}) / (b - a)`, finite for `a == b`
/// (limit `t e^{-a t}`).
pub fn exp_difference(a: f64, b: f64, t: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    t * (-lo * t).exp() * exp_ratio((hi - lo) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_ratio_limit_near_zero() {
        let v = exp_ratio(1e-12);
        assert!((v - 1.0).abs() < 1e-9, "g near 0 should be ~1, got {v}");
        assert_eq!(exp_ratio(0.0), 1.0);
    }

    #[test]
    fn exp_difference_matches_naive_form() {
        let (a, b, t): (f64, f64, f64) = (0.005, 0.0005, 1800.0);
        let naive = ((-a * t).exp() - (-b * t).exp()) / (b - a);
        let stable = exp_difference(a, b, t);
        assert!((naive - stable).abs() / naive.abs() < 1e-12);
    }

    #[test]
    fn exp_difference_equal_rates() {
        let (a, t): (f64, f64) = (0.002, 500.0);
        let expected = t * (-a * t).exp();
        assert!((exp_difference(a, a, t) - expected).abs() < 1e-12);
    }
}
