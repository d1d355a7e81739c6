use rand::Rng;
use rand::distr::Uniform;
use rand_distr::Distribution;

use crate::error::{Result, SimError};
use crate::types::RiskEvent;

/// Impact magnitude model for one risk event.
#[derive(Debug, Clone)]
pub enum ImpactModel {
    /// `impact_min == impact_max`: no draw is taken.
    Fixed(f64),
    /// Continuous uniform on `[impact_min, impact_max]`.
    Uniform(Uniform<f64>),
}

impl ImpactModel {
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self {
            ImpactModel::Fixed(v) => *v,
            ImpactModel::Uniform(dist) => dist.sample(rng),
        }
    }
}

/// Decides occurrence and draws the base impact of a single risk event.
///
/// Occurrence convention: `u` is drawn from the half-open range `[0, 100)` and
/// the event occurs iff `u <= probability`. A probability of 100 therefore
/// always occurs, and probability `p` occurs with chance `p / 100` up to the
/// resolution of the generator.
#[derive(Debug, Clone)]
pub struct EventSampler {
    probability: f64,
    occurrence: Uniform<f64>,
    impact: ImpactModel,
}

impl EventSampler {
    pub fn new(event: &RiskEvent) -> Result<Self> {
        event.validate()?;
        let occurrence = Uniform::new(0.0, 100.0)
            .map_err(|e| SimError::validation(format!("occurrence range: {e}")))?;
        let impact = if event.impact_min == event.impact_max {
            ImpactModel::Fixed(event.impact_min)
        } else {
            let dist = Uniform::new_inclusive(event.impact_min, event.impact_max)
                .map_err(|e| SimError::validation(format!("impact range: {e}")))?;
            ImpactModel::Uniform(dist)
        };
        Ok(EventSampler { probability: event.probability, occurrence, impact })
    }

    /// Build one sampler per event, failing on the first invalid record.
    pub fn for_events(events: &[RiskEvent]) -> Result<Vec<Self>> {
        events.iter().map(EventSampler::new).collect()
    }

    /// One trial's draw: `None` if the event did not occur, otherwise the
    /// unmitigated impact. Exactly one occurrence draw is consumed, plus one
    /// impact draw when the event occurs with a non-degenerate range.
    pub fn sample(&self, rng: &mut impl Rng) -> Option<f64> {
        let u = self.occurrence.sample(rng);
        if u <= self.probability {
            Some(self.impact.sample(rng))
        } else {
            None
        }
    }
}
