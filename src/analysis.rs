use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Distribution statistics for one trial-loss sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub iterations: usize,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    /// Arithmetic mean: the expected annual loss.
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Value at Risk at 95 %: equal to `p95`.
    pub var_95: f64,
    /// Mean of every trial loss at or above `p95`. Never empty: the maximum
    /// always qualifies.
    pub cvar_95: f64,
}

/// Percentile of an ascending sample by linear interpolation between closest
/// ranks: rank `h = p·(N−1)`, blended between `⌊h⌋` and `⌊h⌋+1`.
/// `p` is a fraction in `[0, 1]`. `sorted` must be non-empty.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let h = p * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    // a + (b−a)·f is exact when a == b; the min keeps rounding from
    // overshooting the upper neighbour.
    (a + (b - a) * frac).min(b)
}

/// Mean of non-negative `values` accumulated in units of `scale` (the sample
/// maximum), so sums of large losses cannot overflow.
fn scaled_mean(values: &[f64], scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    values.iter().map(|x| x / scale).sum::<f64>() / values.len() as f64 * scale
}

/// Reduce a full trial-loss sample to its summary.
///
/// Consumes the sample: it is sorted in place and dropped once summarised.
/// Fails with `SimError::Computation` on an empty sample or any non-finite
/// value rather than reporting misleading statistics.
pub fn summarize(mut losses: Vec<f64>) -> Result<SimulationSummary> {
    if losses.is_empty() {
        return Err(SimError::computation("cannot summarise an empty loss sample"));
    }
    if let Some(bad) = losses.iter().find(|v| !v.is_finite()) {
        return Err(SimError::computation(format!("non-finite value {bad} in loss sample")));
    }
    losses.sort_by(f64::total_cmp);
    let n = losses.len();
    let max = losses[n - 1];

    let mean = scaled_mean(&losses, max);
    let std_dev = if max > 0.0 {
        let v = losses.iter().map(|x| ((x - mean) / max).powi(2)).sum::<f64>() / n as f64;
        max * v.sqrt()
    } else {
        0.0
    };

    let p95 = percentile(&losses, 0.95);
    let tail_start = losses.partition_point(|&v| v < p95);
    let cvar_95 = scaled_mean(&losses[tail_start..], max).clamp(p95, max);

    for (name, value) in [("mean", mean), ("standard deviation", std_dev), ("CVaR95", cvar_95)] {
        if !value.is_finite() {
            return Err(SimError::computation(format!("{name} is not finite ({value})")));
        }
    }

    Ok(SimulationSummary {
        iterations: n,
        p10: percentile(&losses, 0.10),
        p25: percentile(&losses, 0.25),
        p50: percentile(&losses, 0.50),
        p75: percentile(&losses, 0.75),
        p90: percentile(&losses, 0.90),
        p95,
        p99: percentile(&losses, 0.99),
        mean,
        std_dev,
        min: losses[0],
        max,
        var_95: p95,
        cvar_95,
    })
}
