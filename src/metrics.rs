//! Business metrics derived from a simulation summary.
//!
//! The constants here are policy, not tuning: changing any of them changes
//! reported results.

use crate::types::{BusinessAsset, DefenseSystem};

/// Share of average defense effectiveness assumed to translate into avoided loss.
pub const EFFECTIVENESS_CREDIT: f64 = 0.8;
/// Ceiling on the assumed loss reduction, however effective the defenses claim to be.
pub const MAX_RISK_REDUCTION: f64 = 0.9;
/// A p90 loss of this size scores 100.
pub const RISK_SCORE_REFERENCE_LOSS: f64 = 1_000_000.0;

/// Σ (cost + maintenance_cost).
pub fn total_defense_cost(defenses: &[DefenseSystem]) -> f64 {
    defenses.iter().map(DefenseSystem::total_cost).sum()
}

pub fn total_asset_value(assets: &[BusinessAsset]) -> f64 {
    assets.iter().map(|a| a.value).sum()
}

/// Mean effectiveness percentage; 0 with no defenses.
pub fn average_effectiveness(defenses: &[DefenseSystem]) -> f64 {
    if defenses.is_empty() {
        return 0.0;
    }
    defenses.iter().map(|d| d.effectiveness).sum::<f64>() / defenses.len() as f64
}

/// Modelled return on defense spend, as a non-negative percentage.
///
/// Assumed avoided loss is `expected_annual_loss × min(avg_eff/100 × 0.8, 0.9)`.
/// ROI = (avoided − cost) / cost × 100, reported as 0 when negative or when
/// the defenses cost nothing.
pub fn security_roi(expected_annual_loss: f64, defenses: &[DefenseSystem]) -> f64 {
    let cost = total_defense_cost(defenses);
    if cost == 0.0 {
        return 0.0;
    }
    let risk_reduction_factor =
        (average_effectiveness(defenses) / 100.0 * EFFECTIVENESS_CREDIT).min(MAX_RISK_REDUCTION);
    let potential_loss_reduction = expected_annual_loss * risk_reduction_factor;
    let roi = (potential_loss_reduction - cost) / cost * 100.0;
    roi.max(0.0)
}

/// Map the p90 loss onto 0..=100, linear up to the reference loss and
/// saturating above it.
pub fn risk_score(p90_severe_impact: f64) -> f64 {
    if p90_severe_impact > 0.0 {
        (p90_severe_impact / RISK_SCORE_REFERENCE_LOSS * 100.0).min(100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_score_saturates() {
        assert_eq!(risk_score(2_000_000.0), 100.0);
        assert_eq!(risk_score(1_000_000.0), 100.0);
        assert_eq!(risk_score(0.0), 0.0);
        assert!((risk_score(500_000.0) - 50.0).abs() < 1e-9);
        assert!((risk_score(12_345.0) - 1.2345).abs() < 1e-9);
    }

    #[test]
    fn roi_is_zero_without_defense_spend() {
        assert_eq!(security_roi(5_000_000.0, &[]), 0.0);
        let free = vec![DefenseSystem::new(90.0, 0.0)];
        assert_eq!(security_roi(5_000_000.0, &free), 0.0);
    }

    #[test]
    fn roi_worked_example() {
        // avg eff 50 → factor 0.4; avoided 400_000; cost 100_000 → ROI 300 %
        let defenses = vec![
            DefenseSystem::new(40.0, 30_000.0).with_maintenance(10_000.0),
            DefenseSystem::new(60.0, 50_000.0).with_maintenance(10_000.0),
        ];
        assert_eq!(total_defense_cost(&defenses), 100_000.0);
        assert!((security_roi(1_000_000.0, &defenses) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn roi_reduction_factor_is_capped() {
        // avg eff 100 → 0.8 (below the 0.9 cap); factor never exceeds 0.9
        let defenses = vec![DefenseSystem::new(100.0, 100_000.0)];
        let roi = security_roi(1_000_000.0, &defenses);
        assert!((roi - 700.0).abs() < 1e-9, "roi {roi}");
        assert!((100.0_f64 / 100.0 * EFFECTIVENESS_CREDIT).min(MAX_RISK_REDUCTION) <= 0.9);
    }

    #[test]
    fn negative_roi_is_reported_as_zero() {
        let defenses = vec![DefenseSystem::new(50.0, 1_000_000.0)];
        assert_eq!(security_roi(10_000.0, &defenses), 0.0);
    }

    #[test]
    fn coverage_does_not_enter_roi() {
        let full = vec![DefenseSystem::new(50.0, 10_000.0)];
        let partial = vec![DefenseSystem::new(50.0, 10_000.0).with_coverage(10.0)];
        assert_eq!(security_roi(1e6, &full), security_roi(1e6, &partial));
    }

    #[test]
    fn totals_sum_records() {
        let assets = vec![BusinessAsset::new(1_000.0), BusinessAsset::new(2_500.0)];
        assert_eq!(total_asset_value(&assets), 3_500.0);
        assert_eq!(total_asset_value(&[]), 0.0);
        assert_eq!(average_effectiveness(&[]), 0.0);
    }
}
