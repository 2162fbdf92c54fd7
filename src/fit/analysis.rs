//! Goodness of fit and derived physical quantities.

use std::f64::consts::LN_2;

use crate::domain::{DecayFit, HalfLife, Measurement};
use crate::error::AppError;
use crate::fit::fitter::N_PARAMS;
use crate::models::predict_all;

/// Half-lives of both isotopes derived from one fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfLives {
    pub strontium: HalfLife,
    pub rubidium: HalfLife,
}

/// Reduced chi-squared `Σ((y − ŷ)/σ)² / (n − 2)`.
pub fn reduced_chi_squared(observed: &[f64], predicted: &[f64], sigma: &[f64]) -> Result<f64, AppError> {
    if observed.len() != predicted.len() || observed.len() != sigma.len() {
        return Err(AppError::numeric("Chi-squared inputs have mismatched lengths."));
    }
    let n = observed.len();
    if n <= N_PARAMS {
        return Err(AppError::numeric(format!(
            "Reduced chi-squared needs more than {N_PARAMS} points (have {n})."
        )));
    }

    let chi_squared: f64 = observed
        .iter()
        .zip(predicted.iter())
        .zip(sigma.iter())
        .map(|((&y, &y_hat), &s)| ((y - y_hat) / s).powi(2))
        .sum();

    if !chi_squared.is_finite() {
        return Err(AppError::numeric("Chi-squared is not finite (zero or invalid uncertainty?)."));
    }

    Ok(chi_squared / (n - N_PARAMS) as f64)
}

/// Reduced chi-squared of `fit` evaluated on `data` with per-point uncertainties.
pub fn fit_reduced_chi_squared(data: &[Measurement], fit: &DecayFit) -> Result<f64, AppError> {
    let times: Vec<f64> = data.iter().map(|m| m.time).collect();
    let observed: Vec<f64> = data.iter().map(|m| m.activity).collect();
    let predicted = predict_all(&times, &fit.constants);
    let sigma: Vec<f64> = data.iter().map(|m| m.activity_uncertainty).collect();
    reduced_chi_squared(&observed, &predicted, &sigma)
}

/// `t½ = ln 2 / λ` with `σ_t½ = t½ σ_λ / λ`.
pub fn half_life(decay_constant: f64, decay_constant_std: f64) -> Result<HalfLife, AppError> {
    if !(decay_constant.is_finite() && decay_constant > 0.0) {
        return Err(AppError::numeric(format!(
            "Half-life undefined for decay constant {decay_constant:e}."
        )));
    }
    let seconds = LN_2 / decay_constant;
    Ok(HalfLife {
        seconds,
        uncertainty_seconds: seconds * (decay_constant_std / decay_constant),
    })
}

pub fn half_lives(fit: &DecayFit) -> Result<HalfLives, AppError> {
    Ok(HalfLives {
        strontium: half_life(fit.constants.strontium, fit.strontium_std())?,
        rubidium: half_life(fit.constants.rubidium, fit.rubidium_std())?,
    })
}
