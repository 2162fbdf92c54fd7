//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::DecayRun;
use crate::bounce::BounceOutcome;
use crate::domain::{BECQUERELS_PER_TERABECQUEREL, DecayConfig, HalfLife, SECONDS_PER_MINUTE};

/// Format the full decay report (row accounting, goodness of fit, constants, half-lives).
pub fn format_decay_report(run: &DecayRun, config: &DecayConfig) -> String {
    let mut out = String::new();
    let fit = &run.final_fit;

    out.push_str("=== physfit - Sr-79 -> Rb-79 decay fit ===\n");
    out.push_str(&format!("Sources: {}\n", run.ingest.sources.join(", ")));
    out.push_str(&format!(
        "Rows: read={} discarded={} outliers={} used={}\n",
        run.ingest.rows_read,
        run.ingest.discarded.len(),
        run.split.rejected.len(),
        run.split.kept.len()
    ));
    out.push_str(&format!("Fit: {} iterations, weighted by uncertainty\n\n", fit.iterations));

    out.push_str(&format!(
        "The reduced chi-squared value for this plot is {:.2}\n",
        run.reduced_chi_squared
    ));
    out.push_str(&format!("Rubidium-79 half-life = {}\n", fmt_half_life(&run.half_lives.rubidium)));
    out.push_str(&format!("Strontium-79 half-life = {}\n", fmt_half_life(&run.half_lives.strontium)));
    out.push_str(&format!(
        "Rubidium-79 decay constant = {} \u{b1} {} per second\n",
        fmt_sig(fit.constants.rubidium, 3),
        fmt_sig(fit.rubidium_std(), 2)
    ));
    out.push_str(&format!(
        "Strontium-79 decay constant = {} \u{b1} {} per second\n",
        fmt_sig(fit.constants.strontium, 3),
        fmt_sig(fit.strontium_std(), 2)
    ));
    out.push_str(&format!(
        "The activity level at the {} minute marker is {} terabecquerel\n",
        fmt_sig(config.report_time / SECONDS_PER_MINUTE, 6),
        fmt_sig(run.report_activity / BECQUERELS_PER_TERABECQUEREL, 3)
    ));

    out
}

/// Format the bounce calculator result.
pub fn format_bounce_report(outcome: &BounceOutcome) -> String {
    format!(
        "The number of bounces before the minimum height is {}\n\
         The total time taken for all the bounces including the 0th bounce before the minimum height is {:.2} seconds\n",
        outcome.bounces, outcome.total_time
    )
}

fn fmt_half_life(h: &HalfLife) -> String {
    format!("{} \u{b1} {} minutes", fmt_sig(h.minutes(), 3), fmt_sig(h.uncertainty_minutes(), 2))
}

/// Format `v` with `sig` significant digits, `%g` style.
///
/// Fixed notation for exponents in `[-4, sig)`, scientific (`1.5e-05`) otherwise;
/// trailing zeros are trimmed either way.
pub fn fmt_sig(v: f64, sig: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let sig = sig.max(1);

    // Let the scientific formatter do the rounding, then read back the exponent.
    let sci = format!("{:.*e}", sig - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= sig as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
