use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{self, SimulationSummary};
use crate::config::{Scenario, SimulationConfig};
use crate::error::{Result, SimError};
use crate::metrics;
use crate::simulation::{CancelToken, Simulation};

/// Percentiles reported alongside the headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCounts {
    pub risk_events: usize,
    pub business_assets: usize,
    pub defense_systems: usize,
}

/// The record handed to storage and API consumers. Field names are part of
/// the external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub p50_median_impact: f64,
    pub p90_severe_impact: f64,
    pub p95_impact: f64,
    pub p99_worst_case: f64,
    pub expected_annual_loss: f64,
    pub value_at_risk_95: f64,
    pub conditional_var_95: f64,
    pub standard_deviation: f64,
    pub maximum_loss: f64,
    pub minimum_loss: f64,
    pub iterations: usize,
    pub confidence_intervals: ConfidenceIntervals,
    pub security_roi: f64,
    pub risk_score: f64,
    /// Σ (cost + maintenance_cost) over all defenses, the same base the ROI
    /// divides by. Older stored records summed `cost` alone.
    pub total_defense_cost: f64,
    pub total_asset_value: f64,
    pub components_analyzed: ComponentCounts,
    pub seed: u64,
}

impl AnalysisResult {
    pub fn from_summary(
        summary: &SimulationSummary,
        scenario: &Scenario,
        seed: u64,
    ) -> Self {
        AnalysisResult {
            p50_median_impact: summary.p50,
            p90_severe_impact: summary.p90,
            p95_impact: summary.p95,
            p99_worst_case: summary.p99,
            expected_annual_loss: summary.mean,
            value_at_risk_95: summary.var_95,
            conditional_var_95: summary.cvar_95,
            standard_deviation: summary.std_dev,
            maximum_loss: summary.max,
            minimum_loss: summary.min,
            iterations: summary.iterations,
            confidence_intervals: ConfidenceIntervals {
                p10: summary.p10,
                p25: summary.p25,
                p75: summary.p75,
                p90: summary.p90,
            },
            security_roi: metrics::security_roi(summary.mean, &scenario.defense_systems),
            risk_score: metrics::risk_score(summary.p90),
            total_defense_cost: metrics::total_defense_cost(&scenario.defense_systems),
            total_asset_value: metrics::total_asset_value(&scenario.business_assets),
            components_analyzed: ComponentCounts {
                risk_events: scenario.risk_events.len(),
                business_assets: scenario.business_assets.len(),
                defense_systems: scenario.defense_systems.len(),
            },
            seed,
        }
    }

    /// Reject records carrying `inf`/`NaN`: they would serialize as `null` and
    /// misreport the run.
    pub fn ensure_finite(&self) -> Result<()> {
        let ci = &self.confidence_intervals;
        let fields = [
            ("p50_median_impact", self.p50_median_impact),
            ("p90_severe_impact", self.p90_severe_impact),
            ("p95_impact", self.p95_impact),
            ("p99_worst_case", self.p99_worst_case),
            ("expected_annual_loss", self.expected_annual_loss),
            ("value_at_risk_95", self.value_at_risk_95),
            ("conditional_var_95", self.conditional_var_95),
            ("standard_deviation", self.standard_deviation),
            ("maximum_loss", self.maximum_loss),
            ("minimum_loss", self.minimum_loss),
            ("confidence_intervals.p10", ci.p10),
            ("confidence_intervals.p25", ci.p25),
            ("confidence_intervals.p75", ci.p75),
            ("confidence_intervals.p90", ci.p90),
            ("security_roi", self.security_roi),
            ("risk_score", self.risk_score),
            ("total_defense_cost", self.total_defense_cost),
            ("total_asset_value", self.total_asset_value),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(SimError::computation(format!("{name} is not finite ({v})"))),
            None => Ok(()),
        }
    }
}

/// Validate, simulate, summarise, and score one scenario.
pub fn analyse(scenario: &Scenario, config: &SimulationConfig) -> Result<AnalysisResult> {
    analyse_with_cancel(scenario, config, CancelToken::new())
}

/// As [`analyse`], abandoning the run with `SimError::Cancelled` once
/// `cancel` is set.
pub fn analyse_with_cancel(
    scenario: &Scenario,
    config: &SimulationConfig,
    cancel: CancelToken,
) -> Result<AnalysisResult> {
    scenario.validate()?;
    let sim = Simulation::new(&scenario.risk_events, &scenario.defense_systems, config.clone())?
        .with_cancel_token(cancel);
    let summary = analysis::summarize(sim.run()?)?;
    let result = AnalysisResult::from_summary(&summary, scenario, config.seed);
    result.ensure_finite()?;
    info!(
        p50 = result.p50_median_impact,
        p90 = result.p90_severe_impact,
        expected_annual_loss = result.expected_annual_loss,
        risk_score = result.risk_score,
        "analysis complete"
    );
    Ok(result)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAverages {
    pub expected_annual_loss: f64,
    pub p90_severe_impact: f64,
    pub security_roi: f64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTrends {
    /// Latest risk score is above the average.
    pub risk_increasing: bool,
    /// Latest ROI is above the average.
    pub roi_improving: bool,
}

/// Roll-up of several analyses of the same scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_analyses: usize,
    pub latest_risk_score: f64,
    pub latest_expected_loss: f64,
    pub averages: HistoryAverages,
    pub trends: HistoryTrends,
}

/// Summarise past results, oldest first; the last entry counts as latest.
/// Returns `None` for an empty history.
pub fn summarize_history(results: &[AnalysisResult]) -> Option<HistorySummary> {
    let latest = results.last()?;
    let n = results.len() as f64;
    let avg = |f: fn(&AnalysisResult) -> f64| results.iter().map(f).sum::<f64>() / n;

    let averages = HistoryAverages {
        expected_annual_loss: avg(|r| r.expected_annual_loss),
        p90_severe_impact: avg(|r| r.p90_severe_impact),
        security_roi: avg(|r| r.security_roi),
        risk_score: avg(|r| r.risk_score),
    };
    let trends = HistoryTrends {
        risk_increasing: latest.risk_score > averages.risk_score,
        roi_improving: latest.security_roi > averages.security_roi,
    };

    Some(HistorySummary {
        total_analyses: results.len(),
        latest_risk_score: latest.risk_score,
        latest_expected_loss: latest.expected_annual_loss,
        averages,
        trends,
    })
}
