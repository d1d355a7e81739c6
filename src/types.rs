use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// An adverse event that may strike in any simulated year.
/// `probability` is a percentage (0, 100], not a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    #[serde(default)]
    pub name: String,
    pub probability: f64,
    pub impact_min: f64, // monetary units
    pub impact_max: f64,
}

/// A deployed control that removes a share of every realised impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseSystem {
    #[serde(default)]
    pub name: String,
    /// Percent of impact neutralised where the defense applies, (0, 100].
    pub effectiveness: f64,
    /// Percent of the impact surface the defense covers, (0, 100].
    #[serde(default = "full_coverage")]
    pub coverage_percentage: f64,
    pub cost: f64,
    #[serde(default)]
    pub maintenance_cost: f64,
}

fn full_coverage() -> f64 {
    100.0
}

/// Something of value the organisation owns. Only reported as a total;
/// asset values play no part in the loss model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAsset {
    #[serde(default)]
    pub name: String,
    pub value: f64,
}

fn label(kind: &str, name: &str) -> String {
    if name.is_empty() { kind.to_string() } else { format!("{kind} '{name}'") }
}

/// `value` must be finite and in `(0, 100]`.
fn check_percent(what: &str, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(())
    } else {
        Err(SimError::validation(format!("{what}: {field} must be in (0, 100], got {value}")))
    }
}

fn check_non_negative(what: &str, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::validation(format!(
            "{what}: {field} must be a finite value >= 0, got {value}"
        )))
    }
}

impl RiskEvent {
    pub fn new(probability: f64, impact_min: f64, impact_max: f64) -> Self {
        RiskEvent { name: String::new(), probability, impact_min, impact_max }
    }

    pub fn validate(&self) -> Result<()> {
        let what = label("risk event", &self.name);
        check_percent(&what, "probability", self.probability)?;
        check_non_negative(&what, "impact_min", self.impact_min)?;
        check_non_negative(&what, "impact_max", self.impact_max)?;
        if self.impact_min > self.impact_max {
            return Err(SimError::validation(format!(
                "{what}: impact_min {} exceeds impact_max {}",
                self.impact_min, self.impact_max
            )));
        }
        Ok(())
    }
}

impl DefenseSystem {
    /// Full coverage, no maintenance cost.
    pub fn new(effectiveness: f64, cost: f64) -> Self {
        DefenseSystem {
            name: String::new(),
            effectiveness,
            coverage_percentage: full_coverage(),
            cost,
            maintenance_cost: 0.0,
        }
    }

    pub fn with_coverage(mut self, coverage_percentage: f64) -> Self {
        self.coverage_percentage = coverage_percentage;
        self
    }

    pub fn with_maintenance(mut self, maintenance_cost: f64) -> Self {
        self.maintenance_cost = maintenance_cost;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let what = label("defense system", &self.name);
        check_percent(&what, "effectiveness", self.effectiveness)?;
        check_percent(&what, "coverage_percentage", self.coverage_percentage)?;
        check_non_negative(&what, "cost", self.cost)?;
        check_non_negative(&what, "maintenance_cost", self.maintenance_cost)
    }

    /// Yearly cost of running the defense: purchase plus maintenance.
    pub fn total_cost(&self) -> f64 {
        self.cost + self.maintenance_cost
    }
}

impl BusinessAsset {
    pub fn new(value: f64) -> Self {
        BusinessAsset { name: String::new(), value }
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative(&label("business asset", &self.name), "value", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_event_accepts_boundary_values() {
        assert!(RiskEvent::new(100.0, 0.0, 0.0).validate().is_ok());
        assert!(RiskEvent::new(0.001, 10.0, 10.0).validate().is_ok());
    }

    #[test]
    fn risk_event_rejects_out_of_range_probability() {
        for p in [0.0, -1.0, 100.5, f64::NAN, f64::INFINITY] {
            let err = RiskEvent::new(p, 0.0, 1.0).validate().unwrap_err();
            assert!(matches!(err, SimError::Validation(_)), "p={p} gave {err:?}");
        }
    }

    #[test]
    fn risk_event_rejects_inverted_impact_range() {
        let mut ev = RiskEvent::new(50.0, 2_000.0, 1_000.0);
        ev.name = "ransomware".to_string();
        let err = ev.validate().unwrap_err();
        let SimError::Validation(msg) = err else { panic!("expected validation error") };
        assert!(msg.contains("ransomware"), "message should name the event: {msg}");
        assert!(msg.contains("impact_min"), "message should name the field: {msg}");
    }

    #[test]
    fn risk_event_rejects_negative_impact() {
        assert!(RiskEvent::new(50.0, -1.0, 10.0).validate().is_err());
    }

    #[test]
    fn defense_rejects_zero_effectiveness_and_coverage() {
        assert!(DefenseSystem::new(0.0, 100.0).validate().is_err());
        assert!(DefenseSystem::new(50.0, 100.0).with_coverage(0.0).validate().is_err());
        assert!(DefenseSystem::new(50.0, -5.0).validate().is_err());
        assert!(DefenseSystem::new(50.0, 5.0).with_maintenance(-1.0).validate().is_err());
        assert!(DefenseSystem::new(100.0, 0.0).validate().is_ok());
    }

    #[test]
    fn defense_optional_fields_take_documented_defaults() {
        let d: DefenseSystem =
            serde_json::from_str(r#"{"effectiveness": 60, "cost": 1000}"#).unwrap();
        assert_eq!(d.coverage_percentage, 100.0);
        assert_eq!(d.maintenance_cost, 0.0);
        assert_eq!(d.name, "");
    }

    #[test]
    fn missing_required_field_is_rejected_not_zeroed() {
        let r: std::result::Result<RiskEvent, _> =
            serde_json::from_str(r#"{"probability": 10, "impact_min": 5}"#);
        assert!(r.is_err(), "impact_max is required");

        let d: std::result::Result<DefenseSystem, _> =
            serde_json::from_str(r#"{"effectiveness": 60}"#);
        assert!(d.is_err(), "cost is required");
    }

    #[test]
    fn total_cost_includes_maintenance() {
        let d = DefenseSystem::new(50.0, 10_000.0).with_maintenance(2_500.0);
        assert_eq!(d.total_cost(), 12_500.0);
    }

    #[test]
    fn asset_value_must_be_non_negative() {
        assert!(BusinessAsset::new(0.0).validate().is_ok());
        assert!(BusinessAsset::new(-1.0).validate().is_err());
    }
}
