//! Linear least-squares building blocks for the Levenberg–Marquardt solver.
//!
//! Each LM iteration solves the damped, column-scaled step problem
//!
//! ```text
//! minimize ‖[Ĵ; √μ I] δ̂ − [r; 0]‖²
//! ```
//!
//! as a tall ordinary least-squares problem. Columns of `Ĵ` are scaled to unit
//! norm beforehand, so singular values are O(1) and fixed tolerances are
//! meaningful regardless of the physical units of the parameters.

use nalgebra::{DMatrix, DVector, Matrix2};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Invert the 2×2 normal matrix `JᵀJ` of a column-scaled Jacobian.
///
/// `scale` holds the column norms that were divided out; the returned matrix is
/// the covariance in the original parameter units, `D⁻¹ (ĴᵀĴ)⁻¹ D⁻¹`.
pub fn scaled_normal_inverse(j_scaled: &DMatrix<f64>, scale: [f64; 2]) -> Option<Matrix2<f64>> {
    if j_scaled.ncols() != 2 {
        return None;
    }
    let jtj = j_scaled.transpose() * j_scaled;
    let normal = Matrix2::new(jtj[(0, 0)], jtj[(0, 1)], jtj[(1, 0)], jtj[(1, 1)]);
    if normal.determinant().abs() < 1e-14 {
        return None;
    }
    let inv = normal.try_inverse()?;

    let cov = Matrix2::from_fn(|i, j| inv[(i, j)] / (scale[i] * scale[j]));
    if cov.iter().all(|v| v.is_finite()) {
        Some(cov)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn scaled_inverse_undoes_column_scaling() {
        // Unscaled J = [[2, 0], [0, 10]] -> JᵀJ = diag(4, 100).
        let j_scaled = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let cov = scaled_normal_inverse(&j_scaled, [2.0, 10.0]).unwrap();
        assert!((cov[(0, 0)] - 0.25).abs() < 1e-12);
        assert!((cov[(1, 1)] - 0.01).abs() < 1e-12);
        assert!(cov[(0, 1)].abs() < 1e-12);
    }

    #[test]
    fn scaled_inverse_rejects_collinear_columns() {
        let j_scaled = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(scaled_normal_inverse(&j_scaled, [1.0, 1.0]).is_none());
    }
}
