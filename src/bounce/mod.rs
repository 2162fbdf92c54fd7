//! Bouncy-ball kinematics.
//!
//! A ball dropped from `h0` loses a fixed fraction of its height at every
//! bounce: `h_{k+1} = e · h_k`. We count bounces until the peak height falls to
//! or below a floor and sum the flight times:
//!
//! - the initial drop takes `√(2 h0 / g)`
//! - every counted bounce to height `h` takes `√(8 h / g)` (rise + fall)

use crate::domain::GRAVITATIONAL_ACCELERATION;

/// Upper bound on the number of bounces a calculation may need.
pub const MAX_BOUNCES: usize = 1_000_000;

/// Validated inputs for one bounce calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceParams {
    pub initial_height: f64,
    pub minimum_height: f64,
    pub coefficient: f64,
}

impl BounceParams {
    /// Validate all three values together.
    pub fn new(initial_height: f64, minimum_height: f64, coefficient: f64) -> Result<Self, String> {
        let initial_height = validate_initial_height(initial_height)?;
        let minimum_height = validate_minimum_height(minimum_height, initial_height)?;
        let coefficient = validate_coefficient(coefficient)?;
        let params = Self {
            initial_height,
            minimum_height,
            coefficient,
        };
        let needed = params.expected_bounces();
        if !(needed <= MAX_BOUNCES as f64) {
            return Err(format!(
                "This would take about {needed:.3e} bounces (limit {MAX_BOUNCES}); use a smaller coefficient or a higher minimum height"
            ));
        }
        Ok(params)
    }

    /// Number of heights the sequence will hold, `⌈ln(h_min / h0) / ln e⌉`.
    pub fn expected_bounces(&self) -> f64 {
        ((self.minimum_height.ln() - self.initial_height.ln()) / self.coefficient.ln()).ceil()
    }
}

/// Result of a bounce calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BounceOutcome {
    /// Peak height after each bounce; the last entry is the first one at or below the floor.
    pub heights: Vec<f64>,
    pub bounces: usize,
    pub total_time: f64,
}

pub fn validate_initial_height(h: f64) -> Result<f64, String> {
    if !h.is_finite() {
        return Err("Please enter a finite number".to_string());
    }
    if h <= 0.0 {
        return Err("Value must be greater than 0".to_string());
    }
    Ok(h)
}

/// The floor must be a positive normal number so the height sequence terminates.
pub fn validate_minimum_height(h: f64, initial_height: f64) -> Result<f64, String> {
    if !h.is_finite() {
        return Err("Please enter a finite number".to_string());
    }
    if h <= 0.0 {
        return Err("Value must be greater than 0".to_string());
    }
    if h < f64::MIN_POSITIVE {
        return Err(format!("Value must be at least {:e}", f64::MIN_POSITIVE));
    }
    if h >= initial_height {
        return Err("Minimum height must be less than the initial height".to_string());
    }
    Ok(h)
}

pub fn validate_coefficient(e: f64) -> Result<f64, String> {
    if !(e.is_finite() && e > 0.0 && e < 1.0) {
        return Err("Value must be more than 0 and less than 1".to_string());
    }
    Ok(e)
}

/// Peak heights after each bounce, stopping at the first one `<= minimum_height`.
pub fn bounce_heights(params: &BounceParams) -> Vec<f64> {
    let mut heights = Vec::new();
    let mut h = params.initial_height;
    while h > params.minimum_height && heights.len() < MAX_BOUNCES {
        let next = h * params.coefficient;
        if next >= h {
            // Rounding swallowed the step.
            break;
        }
        h = next;
        heights.push(h);
    }
    heights
}

/// Time of the drop from rest at height `h`.
pub fn fall_time(h: f64) -> f64 {
    (2.0 * h / GRAVITATIONAL_ACCELERATION).sqrt()
}

/// Time of a full bounce (rise + fall) peaking at `h`.
pub fn bounce_time(h: f64) -> f64 {
    (8.0 * h / GRAVITATIONAL_ACCELERATION).sqrt()
}

/// Initial drop plus every bounce except the final, sub-floor one.
pub fn total_time(initial_height: f64, heights: &[f64]) -> f64 {
    let counted = heights.len().saturating_sub(1);
    fall_time(initial_height) + heights[..counted].iter().map(|&h| bounce_time(h)).sum::<f64>()
}

pub fn simulate_bounces(params: &BounceParams) -> BounceOutcome {
    let heights = bounce_heights(params);
    let bounces = heights.len().saturating_sub(1);
    let total_time = total_time(params.initial_height, &heights);
    log::info!(
        "bounce: h0={} floor={} e={} -> {} bounces, {:.4}s",
        params.initial_height,
        params.minimum_height,
        params.coefficient,
        bounces,
        total_time
    );
    BounceOutcome {
        heights,
        bounces,
        total_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_example() {
        let params = BounceParams::new(2.0, 0.01, 0.5).unwrap();
        let out = simulate_bounces(&params);
        assert_eq!(out.heights.len(), 8);
        assert_eq!(out.bounces, 7);
        assert_eq!(*out.heights.last().unwrap(), 0.0078125);
        assert!((out.total_time - 3.449_756_036).abs() < 1e-8, "{}", out.total_time);
    }

    #[test]
    fn heights_strictly_decrease_and_terminate_below_floor() {
        for &h0 in &[0.5, 2.0, 37.0] {
            for &floor_frac in &[1e-6, 0.01, 0.5, 0.999] {
                for &e in &[0.01, 0.3, 0.9, 0.999] {
                    let params = BounceParams::new(h0, h0 * floor_frac, e).unwrap();
                    let out = simulate_bounces(&params);

                    assert!(!out.heights.is_empty());
                    assert!(out.heights.windows(2).all(|w| w[1] < w[0]));
                    assert!(*out.heights.last().unwrap() <= params.minimum_height);
                    for h in &out.heights[..out.heights.len() - 1] {
                        assert!(*h > params.minimum_height);
                    }
                    assert_eq!(out.bounces, out.heights.len() - 1);
                }
            }
        }
    }

    #[test]
    fn total_time_is_drop_plus_counted_bounces() {
        let params = BounceParams::new(10.0, 0.2, 0.7).unwrap();
        let out = simulate_bounces(&params);
        let mut expected = fall_time(10.0);
        for h in &out.heights[..out.bounces] {
            expected += bounce_time(*h);
        }
        assert!((out.total_time - expected).abs() < 1e-12);
    }

    #[test]
    fn single_sub_floor_bounce_counts_zero() {
        let params = BounceParams::new(1.0, 0.6, 0.5).unwrap();
        let out = simulate_bounces(&params);
        assert_eq!(out.heights, vec![0.5]);
        assert_eq!(out.bounces, 0);
        assert!((out.total_time - fall_time(1.0)).abs() < 1e-12);
    }

    #[test]
    fn validation_rejects_out_of_range_inputs() {
        assert!(BounceParams::new(0.0, 0.0, 0.5).is_err());
        assert!(BounceParams::new(-1.0, 0.1, 0.5).is_err());
        assert!(BounceParams::new(1.0, 1.0, 0.5).is_err());
        assert!(BounceParams::new(1.0, 2.0, 0.5).is_err());
        assert!(BounceParams::new(1.0, 0.0, 0.5).is_err());
        assert!(BounceParams::new(1.0, 0.1, 0.0).is_err());
        assert!(BounceParams::new(1.0, 0.1, 1.0).is_err());
        assert!(BounceParams::new(f64::NAN, 0.1, 0.5).is_err());
        assert!(BounceParams::new(1.0, 0.1, f64::INFINITY).is_err());
    }

    #[test]
    fn subnormal_floor_is_rejected() {
        assert!(validate_minimum_height(1e-323, 1.0).is_err());
        assert!(BounceParams::new(1.0, 1e-323, 0.9).is_err());
    }

    #[test]
    fn smallest_normal_floor_terminates() {
        let params = BounceParams::new(1.0, f64::MIN_POSITIVE, 0.5).unwrap();
        let out = simulate_bounces(&params);
        assert_eq!(out.heights.len(), 1022);
        assert!(*out.heights.last().unwrap() <= params.minimum_height);
        assert!(out.heights.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn coefficient_too_close_to_one_is_rejected() {
        let err = BounceParams::new(1.0, 0.01, 0.999_999_999_999_999_9).unwrap_err();
        assert!(err.contains("bounces"), "{err}");
        assert!(BounceParams::new(1.0, 0.01, 0.9999).is_ok());
    }
}
