use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::{BusinessAsset, DefenseSystem, RiskEvent};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ITERATIONS: usize = 10_000;
pub const DEFAULT_CHUNK_SIZE: usize = 1_000;

/// Run parameters. The loss distribution depends only on the scenario;
/// `iterations` controls how much sampling noise the estimates carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    pub iterations: usize,
    /// Trials per RNG stream. Part of the reproducibility key together with
    /// `seed`: changing it changes which draws land in which trial.
    pub chunk_size: usize,
    /// Run chunks on the rayon pool. Output is identical either way.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: DEFAULT_SEED,
            iterations: DEFAULT_ITERATIONS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SimError::validation("iterations must be a positive integer"));
        }
        if self.chunk_size == 0 {
            return Err(SimError::validation("chunk_size must be a positive integer"));
        }
        Ok(())
    }

    /// Config for run `i` of a multi-seed spread: same parameters, seed
    /// offset by `i`, wrapping at `u64::MAX`.
    pub fn for_run(&self, i: u64) -> Self {
        SimulationConfig { seed: self.seed.wrapping_add(i), ..self.clone() }
    }
}

/// Everything one analysis reads: the risk events to simulate, the assets
/// being protected, and the defenses in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub risk_events: Vec<RiskEvent>,
    #[serde(default)]
    pub business_assets: Vec<BusinessAsset>,
    #[serde(default)]
    pub defense_systems: Vec<DefenseSystem>,
}

impl Scenario {
    /// Check every record. Fails on the first problem found, before any
    /// trial has been run.
    pub fn validate(&self) -> Result<()> {
        if self.risk_events.is_empty() {
            return Err(SimError::validation("at least one risk event required"));
        }
        for e in &self.risk_events {
            e.validate()?;
        }
        for a in &self.business_assets {
            a.validate()?;
        }
        for d in &self.defense_systems {
            d.validate()?;
        }
        Ok(())
    }

    /// A small mid-market company profile, used when no scenario file is given.
    pub fn demo() -> Self {
        let event = |name: &str, probability, impact_min, impact_max| RiskEvent {
            name: name.to_string(),
            probability,
            impact_min,
            impact_max,
        };
        let asset = |name: &str, value| BusinessAsset { name: name.to_string(), value };
        let defense = |name: &str, effectiveness, coverage_percentage, cost, maintenance_cost| {
            DefenseSystem {
                name: name.to_string(),
                effectiveness,
                coverage_percentage,
                cost,
                maintenance_cost,
            }
        };

        Scenario {
            risk_events: vec![
                event("ransomware", 15.0, 200_000.0, 2_500_000.0),
                event("phishing compromise", 45.0, 10_000.0, 150_000.0),
                event("supplier outage", 20.0, 50_000.0, 600_000.0),
                event("data breach litigation", 5.0, 500_000.0, 4_000_000.0),
                event("insider fraud", 8.0, 25_000.0, 400_000.0),
            ],
            business_assets: vec![
                asset("ERP platform", 3_000_000.0),
                asset("customer database", 5_000_000.0),
                asset("head office", 12_000_000.0),
            ],
            defense_systems: vec![
                defense("EDR", 70.0, 85.0, 120_000.0, 30_000.0),
                defense("security awareness training", 40.0, 100.0, 25_000.0, 10_000.0),
                defense("offsite backups", 60.0, 60.0, 40_000.0, 12_000.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let c = SimulationConfig::default();
        assert_eq!(c.seed, 42);
        assert_eq!(c.iterations, 10_000);
        assert_eq!(c.chunk_size, 1_000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let c = SimulationConfig { iterations: 0, ..SimulationConfig::default() };
        assert!(matches!(c.validate(), Err(SimError::Validation(_))));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let c = SimulationConfig { chunk_size: 0, ..SimulationConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn run_seeds_wrap_at_u64_max() {
        let base = SimulationConfig { seed: u64::MAX, iterations: 500, ..SimulationConfig::default() };
        assert_eq!(base.for_run(0), base);
        let next = base.for_run(1);
        assert_eq!(next.seed, 0);
        assert_eq!(next.iterations, 500);
        assert_eq!(base.for_run(3).seed, 2);
    }

    #[test]
    fn demo_scenario_is_valid() {
        assert!(Scenario::demo().validate().is_ok());
    }

    #[test]
    fn empty_scenario_requires_a_risk_event() {
        let err = Scenario::default().validate().unwrap_err();
        assert_eq!(err, SimError::validation("at least one risk event required"));
    }

    #[test]
    fn scenario_json_with_only_risk_events() {
        let s: Scenario = serde_json::from_str(
            r#"{"risk_events": [{"probability": 30, "impact_min": 100, "impact_max": 900}]}"#,
        )
        .unwrap();
        assert_eq!(s.risk_events.len(), 1);
        assert!(s.business_assets.is_empty());
        assert!(s.defense_systems.is_empty());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn invalid_record_anywhere_fails_validation() {
        let mut s = Scenario::demo();
        s.business_assets.push(BusinessAsset::new(f64::NAN));
        assert!(s.validate().is_err());
    }
}
