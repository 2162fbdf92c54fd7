//! Nonlinear least-squares fit of the two decay constants.
//!
//! Given:
//! - times `t_i`
//! - observed activities `y_i`
//! - per-point scales `σ_i` (all 1 when unweighted)
//! - a starting guess `p0 = (λs, λr)`
//!
//! we minimize `Σ ((y_i − A(t_i; p)) / σ_i)²` with Levenberg–Marquardt:
//! - the Jacobian is rebuilt at every accepted point
//! - columns are scaled to unit norm (Marquardt scaling), so a single damping
//!   parameter `μ` works for parameters of any magnitude
//! - each trial step is a small augmented least-squares solve (SVD)
//!
//! The covariance at the optimum is `(JᵀJ)⁻¹`, rescaled by the residual
//! variance when the fit is unweighted.

use nalgebra::{DMatrix, DVector};

use crate::domain::{DecayConstants, DecayFit, Measurement, Weighting};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::math::{scaled_normal_inverse, solve_least_squares};
use crate::models::{activity_gradient, rubidium_activity};

/// Number of fitted parameters.
pub const N_PARAMS: usize = 2;

const MU_INIT: f64 = 1e-3;
const MU_MIN: f64 = 1e-12;
/// Past this damping no step can reduce the cost; the current point is a minimum.
const MU_MAX: f64 = 1e16;

/// Relative cost-reduction tolerance.
const FTOL: f64 = 1e-12;
/// Relative step-size tolerance.
const XTOL: f64 = 1e-12;

/// Options that affect how a single fit is calibrated.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub weighting: Weighting,
    pub initial: DecayConstants,
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            weighting: Weighting::Unweighted,
            initial: DecayConstants::initial_guess(),
            max_iterations: 200,
        }
    }
}

/// Fit the decay constants to `data`.
pub fn fit_decay(data: &[Measurement], opts: &FitOptions) -> Result<DecayFit, AppError> {
    let n = data.len();
    if n <= N_PARAMS {
        return Err(AppError::new(
            EXIT_NO_DATA,
            format!("Need more than {N_PARAMS} points to fit {N_PARAMS} parameters (have {n})."),
        ));
    }
    if !opts.initial.is_finite() {
        return Err(AppError::usage("Initial decay constants must be finite."));
    }

    let times: Vec<f64> = data.iter().map(|m| m.time).collect();
    let y: Vec<f64> = data.iter().map(|m| m.activity).collect();
    let sigma = resolve_sigma(data, opts.weighting)?;

    if times.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::numeric("Non-finite time or activity in fit input."));
    }

    let mut p = opts.initial;
    let mut r = weighted_residuals(&times, &y, &sigma, &p);
    let mut cost = sum_sq(&r);
    if !cost.is_finite() {
        return Err(AppError::numeric("Fit cost is not finite at the initial guess."));
    }

    let mut mu = MU_INIT;
    let mut converged = false;
    let mut iterations = 0usize;

    while iterations < opts.max_iterations {
        iterations += 1;
        let (j_scaled, scale) = scaled_jacobian(&times, &sigma, &p)?;

        loop {
            let Some(step) = damped_step(&j_scaled, &scale, &r, mu) else {
                mu *= 10.0;
                if mu > MU_MAX {
                    converged = true;
                    break;
                }
                continue;
            };

            let p_old = p.to_array();
            let trial = DecayConstants::from_array([p_old[0] + step[0], p_old[1] + step[1]]);
            let r_trial = weighted_residuals(&times, &y, &sigma, &trial);
            let cost_trial = sum_sq(&r_trial);

            if trial.is_finite() && cost_trial.is_finite() && cost_trial < cost {
                let reduction = cost - cost_trial;
                let small_step = (0..N_PARAMS).all(|k| step[k].abs() <= XTOL * (p_old[k].abs() + XTOL));

                p = trial;
                r = r_trial;
                cost = cost_trial;
                mu = (mu / 10.0).max(MU_MIN);

                log::trace!(
                    "lm iter {iterations}: cost={cost:.6e} mu={mu:.1e} lambda_sr={:.6e} lambda_rb={:.6e}",
                    p.strontium,
                    p.rubidium
                );

                if reduction <= FTOL * (cost + reduction) || small_step || cost == 0.0 {
                    converged = true;
                }
                break;
            }

            mu *= 10.0;
            if mu > MU_MAX {
                converged = true;
                break;
            }
        }

        if converged {
            break;
        }
    }

    if !converged {
        return Err(AppError::numeric(format!(
            "Decay fit did not converge within {} iterations (cost={cost:.6e}).",
            opts.max_iterations
        )));
    }

    let (j_scaled, scale) = scaled_jacobian(&times, &sigma, &p)?;
    let mut covariance = scaled_normal_inverse(&j_scaled, scale)
        .ok_or_else(|| AppError::numeric("Singular normal matrix: covariance of the fit is undefined."))?;

    if opts.weighting == Weighting::Unweighted {
        let dof = (n - N_PARAMS) as f64;
        covariance *= cost / dof;
    }

    log::debug!(
        "fit ({:?}) converged after {iterations} iterations: lambda_sr={:.6e} lambda_rb={:.6e} cost={cost:.6e}",
        opts.weighting,
        p.strontium,
        p.rubidium
    );

    Ok(DecayFit {
        constants: p,
        covariance,
        weighting: opts.weighting,
        cost,
        iterations,
        n,
    })
}

fn resolve_sigma(data: &[Measurement], weighting: Weighting) -> Result<Vec<f64>, AppError> {
    match weighting {
        Weighting::Unweighted => Ok(vec![1.0; data.len()]),
        Weighting::Uncertainty => data
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let s = m.activity_uncertainty;
                if s.is_finite() && s > 0.0 {
                    Ok(s)
                } else {
                    Err(AppError::numeric(format!(
                        "Weighted fit needs positive uncertainties (point {i} has {s})."
                    )))
                }
            })
            .collect(),
    }
}

fn weighted_residuals(times: &[f64], y: &[f64], sigma: &[f64], p: &DecayConstants) -> Vec<f64> {
    times
        .iter()
        .zip(y.iter())
        .zip(sigma.iter())
        .map(|((&t, &yi), &s)| (yi - rubidium_activity(t, p)) / s)
        .collect()
}

fn sum_sq(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Weighted Jacobian of the model with unit-norm columns, plus the column norms.
fn scaled_jacobian(
    times: &[f64],
    sigma: &[f64],
    p: &DecayConstants,
) -> Result<(DMatrix<f64>, [f64; 2]), AppError> {
    let n = times.len();
    let mut j = DMatrix::<f64>::zeros(n, N_PARAMS);
    for i in 0..n {
        let g = activity_gradient(times[i], p);
        j[(i, 0)] = g[0] / sigma[i];
        j[(i, 1)] = g[1] / sigma[i];
    }

    let mut scale = [0.0; 2];
    for (k, s) in scale.iter_mut().enumerate() {
        let norm = j.column(k).norm();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(AppError::numeric(format!(
                "Model Jacobian column {k} vanished at lambda_sr={:.6e}, lambda_rb={:.6e}.",
                p.strontium, p.rubidium
            )));
        }
        *s = norm;
        for v in j.column_mut(k).iter_mut() {
            *v /= norm;
        }
    }

    Ok((j, scale))
}

/// Solve `[Ĵ; √μ I] δ̂ = [r; 0]` and undo the column scaling.
fn damped_step(j_scaled: &DMatrix<f64>, scale: &[f64; 2], r: &[f64], mu: f64) -> Option<[f64; 2]> {
    let n = j_scaled.nrows();
    let damp = mu.sqrt();

    let mut x = DMatrix::<f64>::zeros(n + N_PARAMS, N_PARAMS);
    x.rows_mut(0, n).copy_from(j_scaled);
    x[(n, 0)] = damp;
    x[(n + 1, 1)] = damp;

    let mut rhs = DVector::<f64>::zeros(n + N_PARAMS);
    for (i, &ri) in r.iter().enumerate() {
        rhs[i] = ri;
    }

    let delta = solve_least_squares(&x, &rhs)?;
    Some([delta[0] / scale[0], delta[1] / scale[1]])
}
