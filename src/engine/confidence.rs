// Confidence Estimator - how much the evidence base supports the decision
use std::time::Duration;

use crate::models::check::CheckResult;

/// Bonus granted per successful check that finished within half its budget.
pub const QUALITY_BONUS_PER_CHECK: f64 = 2.0;
/// Cap on the total quality bonus.
pub const QUALITY_BONUS_CAP: f64 = 6.0;

/// Weight of the completion ratio in the confidence formula.
const COMPLETION_WEIGHT: f64 = 80.0;
/// Bonus per completed safety-critical check, counted up to two.
const CRITICAL_COMPLETED_BONUS: f64 = 10.0;
/// Penalty per failed safety-critical check.
const CRITICAL_FAILED_PENALTY: f64 = 15.0;

/// Estimates confidence in [0, 100] from how many checks completed, how the
/// safety-critical ones fared, and how promptly evidence arrived.
///
/// With no attempted checks at all there is nothing to be confident about,
/// so the estimate is 0.
pub fn estimate(
    successful: &[CheckResult],
    failed: &[CheckResult],
    check_budget: Duration,
) -> f64 {
    let total = successful.len() + failed.len();
    if total == 0 {
        return 0.0;
    }

    let completion = successful.len() as f64 / total as f64;
    let critical_completed = successful
        .iter()
        .filter(|result| result.category.is_safety_critical())
        .count()
        .min(2);
    let critical_failed = failed
        .iter()
        .filter(|result| result.category.is_safety_critical())
        .count();

    let half_budget_ms = (check_budget.as_millis() / 2) as u64;
    let quality_bonus = (successful
        .iter()
        .filter(|result| result.execution_time_ms <= half_budget_ms)
        .count() as f64
        * QUALITY_BONUS_PER_CHECK)
        .min(QUALITY_BONUS_CAP);

    let raw = COMPLETION_WEIGHT * completion
        + CRITICAL_COMPLETED_BONUS * critical_completed as f64
        - CRITICAL_FAILED_PENALTY * critical_failed as f64
        + quality_bonus;

    raw.max(0.0).min(100.0)
}
