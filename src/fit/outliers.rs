//! Sigma-clipping of observations against a preliminary fit.

use crate::domain::{DecayConstants, Measurement};
use crate::models::rubidium_activity;

/// Split of the input rows into kept and rejected observations.
#[derive(Debug, Clone, Default)]
pub struct OutlierSplit {
    pub kept: Vec<Measurement>,
    pub rejected: Vec<Measurement>,
}

/// Keep exactly the rows with `|A(t) − activity| < k σ`.
///
/// The comparison is strict, so rows with zero uncertainty are always rejected
/// (as are rows whose deviation or uncertainty is not finite).
pub fn reject_outliers(data: &[Measurement], constants: &DecayConstants, k: f64) -> OutlierSplit {
    let mut split = OutlierSplit::default();
    for m in data {
        let deviation = (rubidium_activity(m.time, constants) - m.activity).abs();
        if deviation < k * m.activity_uncertainty {
            split.kept.push(*m);
        } else {
            log::debug!(
                "rejecting t={:.1}s A={:.4e}Bq: deviation {:.4e} >= {k}σ ({:.4e})",
                m.time,
                m.activity,
                deviation,
                k * m.activity_uncertainty
            );
            split.rejected.push(*m);
        }
    }
    split
}
