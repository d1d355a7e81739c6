use crate::error::Result;
use crate::types::DefenseSystem;

/// Fraction of an impact one defense removes: effectiveness × coverage,
/// both given as percentages.
pub fn reduction(defense: &DefenseSystem) -> f64 {
    let r = (defense.effectiveness / 100.0) * (defense.coverage_percentage / 100.0);
    r.clamp(0.0, 1.0)
}

/// Applies a fixed set of defenses to base impacts.
///
/// Each defense blocks its fraction of whatever impact is left after the
/// others, so the defenses reduce to one residual factor
/// `Π (1 − reduction_i)`. The factor is computed once per run; composing
/// an impact is a single multiply and never touches the RNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MitigationComposer {
    residual_factor: f64,
}

impl MitigationComposer {
    pub fn new(defenses: &[DefenseSystem]) -> Result<Self> {
        for d in defenses {
            d.validate()?;
        }
        let residual_factor = defenses.iter().map(|d| 1.0 - reduction(d)).product();
        Ok(MitigationComposer { residual_factor })
    }

    /// No defenses: impacts pass through unchanged.
    pub fn none() -> Self {
        MitigationComposer { residual_factor: 1.0 }
    }

    /// Share of any base impact that survives all defenses, in `[0, 1]`.
    pub fn residual_factor(&self) -> f64 {
        self.residual_factor
    }

    pub fn mitigate(&self, base_impact: f64) -> f64 {
        (base_impact * self.residual_factor).max(0.0)
    }
}
