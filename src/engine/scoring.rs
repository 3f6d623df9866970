// Scoring Engine - weighted aggregation of check results into one score
use tracing::debug;

use crate::models::check::{CheckResult, CheckStatus};

/// Weight multiplier applied to partial-evidence (warning) results.
pub const WARNING_WEIGHT_FACTOR: f64 = 0.8;

/// Score assigned when no successful evidence exists. Absence of
/// evidence is maximum risk, never neutral.
pub const NO_EVIDENCE_SCORE: f64 = 100.0;

/// Computes the overall risk score as the weighted average of successful
/// results, clamped to [0, 100]. Deterministic: same results, same score.
pub fn overall_score(successful: &[CheckResult]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for result in successful {
        if !result.status.is_successful() {
            continue;
        }
        let mut weight = result.weight;
        if result.status == CheckStatus::Warning {
            weight *= WARNING_WEIGHT_FACTOR;
        }
        if weight <= 0.0 {
            continue;
        }
        weighted_sum += result.risk_score * weight;
        weight_total += weight;
    }

    if weight_total <= f64::EPSILON {
        return NO_EVIDENCE_SCORE;
    }

    let score = (weighted_sum / weight_total).max(0.0).min(100.0);
    debug!(
        score = %format!("{:.2}", score),
        checks = successful.len(),
        weight_total = %format!("{:.3}", weight_total),
        "Aggregated overall risk score"
    );
    score
}
