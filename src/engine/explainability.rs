// Explainability Reporter - turns a verdict into signals, narrative, and
// counterfactuals a human can act on
use std::cmp::Reverse;

use serde::Serialize;

use crate::config::RiskProfile;
use crate::engine::decision::{
    DecisionOutcome, DecisionReason, ABSOLUTE_MIN_LIQUIDITY_USD, HARD_BLOCK_SCORE,
};
use crate::models::assessment::{Decision, RiskLevel, RiskSignal};
use crate::models::check::{CheckCategory, CheckResult, CheckStatus};

/// Counterfactuals reported per assessment, at most.
pub const MAX_COUNTERFACTUALS: usize = 3;

/// Human-facing explanation of one assessment. Every value quoted here
/// comes from a check detail, a fired reason, or the active profile,
/// never from guesswork.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// Findings ordered most severe first.
    pub signals: Vec<RiskSignal>,
    /// One short paragraph naming the decision and its dominant reason.
    pub narrative: String,
    /// Up to three minimal changes that would flip the decision.
    pub counterfactuals: Vec<String>,
}

pub fn build_explanation(
    outcome: &DecisionOutcome,
    successful: &[CheckResult],
    failed: &[CheckResult],
    overall_score: f64,
    profile: &RiskProfile,
) -> Explanation {
    let signals = build_signals(outcome, successful, failed);
    let narrative = build_narrative(outcome, successful, failed);
    let counterfactuals = build_counterfactuals(outcome, successful, overall_score, profile);
    Explanation {
        signals,
        narrative,
        counterfactuals,
    }
}

fn build_signals(
    outcome: &DecisionOutcome,
    successful: &[CheckResult],
    failed: &[CheckResult],
) -> Vec<RiskSignal> {
    let reason_severity = match outcome.decision {
        Decision::Block => RiskLevel::Critical,
        Decision::Skip => RiskLevel::High,
        Decision::Approve => RiskLevel::Minimal,
    };

    let mut signals = Vec::new();
    for reason in &outcome.reasons {
        let (category, headline) = reason_headline(reason);
        signals.push(RiskSignal {
            category,
            severity: reason_severity,
            headline,
        });
    }

    let mut by_score: Vec<&CheckResult> = successful.iter().collect();
    by_score.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    for result in by_score {
        let qualifier = if result.status == CheckStatus::Warning {
            " (partial evidence)"
        } else {
            ""
        };
        signals.push(RiskSignal {
            category: Some(result.category),
            severity: RiskLevel::from_score(result.risk_score),
            headline: format!(
                "{} reported risk {:.1}{}",
                result.category, result.risk_score, qualifier
            ),
        });
    }

    for result in failed {
        let verb = if result.status == CheckStatus::Timeout {
            "timed out without producing evidence"
        } else {
            "failed without producing evidence"
        };
        let severity = if result.category.is_safety_critical() {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        signals.push(RiskSignal {
            category: Some(result.category),
            severity,
            headline: format!("{} {}", result.category, verb),
        });
    }

    // Stable: reasons stay ahead of same-severity check findings.
    signals.sort_by_key(|signal| Reverse(signal.severity));
    signals
}

fn build_narrative(
    outcome: &DecisionOutcome,
    successful: &[CheckResult],
    failed: &[CheckResult],
) -> String {
    let total = successful.len() + failed.len();
    let dominant = outcome
        .primary()
        .map(|reason| reason_headline(reason).1)
        .unwrap_or_else(|| "no rule fired".to_string());
    format!(
        "{}: {} ({} of {} checks completed).",
        outcome.decision.as_str().to_uppercase(),
        dominant,
        successful.len(),
        total
    )
}

fn build_counterfactuals(
    outcome: &DecisionOutcome,
    successful: &[CheckResult],
    overall_score: f64,
    profile: &RiskProfile,
) -> Vec<String> {
    match outcome.decision {
        Decision::Block | Decision::Skip => outcome
            .reasons
            .iter()
            .filter_map(|reason| reason_counterfactual(reason, profile))
            .take(MAX_COUNTERFACTUALS)
            .collect(),
        Decision::Approve => nearest_misses(successful, overall_score, profile),
    }
}

/// For approvals: the thresholds this asset came closest to tripping,
/// nearest first.
fn nearest_misses(
    successful: &[CheckResult],
    overall_score: f64,
    profile: &RiskProfile,
) -> Vec<String> {
    let mut misses: Vec<(f64, String)> = Vec::new();

    let tolerance_margin = profile.max_acceptable_risk - overall_score;
    if tolerance_margin >= 0.0 {
        misses.push((
            tolerance_margin,
            format!(
                "Overall risk above {:.1} would downgrade this approval to a skip",
                profile.max_acceptable_risk
            ),
        ));
    }

    for result in successful {
        if let Some(threshold) = profile.blocking_threshold(result.category) {
            let margin = threshold - result.risk_score;
            if margin >= 0.0 {
                misses.push((
                    margin,
                    format!(
                        "A {} score of {:.1} or more would block the asset",
                        result.category, threshold
                    ),
                ));
            }
        }
    }

    misses.sort_by(|a, b| a.0.total_cmp(&b.0));
    misses
        .into_iter()
        .take(MAX_COUNTERFACTUALS)
        .map(|(_, text)| text)
        .collect()
}

fn reason_headline(reason: &DecisionReason) -> (Option<CheckCategory>, String) {
    match reason {
        DecisionReason::ConfirmedFraud { category } => (
            Some(*category),
            format!("{} check confirmed honeypot behaviour", category),
        ),
        DecisionReason::TransfersDisabled { category } => {
            (Some(*category), "Token transfers are disabled".to_string())
        }
        DecisionReason::LiquidityBelowAbsoluteFloor { liquidity_usd } => (
            Some(CheckCategory::Liquidity),
            format!(
                "Liquidity ${:.0} is under the absolute ${:.0} floor",
                liquidity_usd, ABSOLUTE_MIN_LIQUIDITY_USD
            ),
        ),
        DecisionReason::CategoryAtBlockingThreshold {
            category,
            score,
            threshold,
        } => (
            Some(*category),
            format!(
                "{} risk {:.1} is at or above its blocking threshold {:.1}",
                category, score, threshold
            ),
        ),
        DecisionReason::OwnershipNotRenounced => (
            Some(CheckCategory::Ownership),
            "Contract ownership has not been renounced".to_string(),
        ),
        DecisionReason::SellTaxAboveMaximum {
            sell_tax_percent,
            max_sell_tax_percent,
        } => (
            Some(CheckCategory::TaxAnalysis),
            format!(
                "Sell tax {:.1}% exceeds the {:.1}% allowed",
                sell_tax_percent, max_sell_tax_percent
            ),
        ),
        DecisionReason::LiquidityBelowProfileMinimum {
            liquidity_usd,
            min_liquidity_usd,
        } => (
            Some(CheckCategory::Liquidity),
            format!(
                "Liquidity ${:.0} is under the ${:.0} profile minimum",
                liquidity_usd, min_liquidity_usd
            ),
        ),
        DecisionReason::CriticalChecksFailed { failed } => (
            None,
            format!("{} safety-critical checks produced no evidence", failed),
        ),
        DecisionReason::NoSuccessfulChecks => (
            None,
            "No check produced usable evidence; treated as maximum risk".to_string(),
        ),
        DecisionReason::ScoreAtHardBlock { score } => (
            None,
            format!(
                "Overall risk {:.1} is at or above the hard block line {:.0}",
                score, HARD_BLOCK_SCORE
            ),
        ),
        DecisionReason::ScoreAboveTolerance {
            score,
            max_acceptable_risk,
        } => (
            None,
            format!(
                "Overall risk {:.1} exceeds the profile tolerance {:.1}",
                score, max_acceptable_risk
            ),
        ),
        DecisionReason::WithinTolerance {
            score,
            max_acceptable_risk,
        } => (
            None,
            format!(
                "Overall risk {:.1} is within the profile tolerance {:.1}",
                score, max_acceptable_risk
            ),
        ),
    }
}

/// The single change that would stop this reason from firing. Liquidity
/// targets quote whichever of the absolute floor and the profile minimum
/// is higher, so the suggestion actually clears both rules.
fn reason_counterfactual(reason: &DecisionReason, profile: &RiskProfile) -> Option<String> {
    match reason {
        DecisionReason::ConfirmedFraud { .. } => Some(
            "A fraud simulation that no longer confirms honeypot behaviour would lift the block"
                .to_string(),
        ),
        DecisionReason::TransfersDisabled { .. } => {
            Some("Enabling token transfers would lift the block".to_string())
        }
        DecisionReason::LiquidityBelowAbsoluteFloor { .. }
        | DecisionReason::LiquidityBelowProfileMinimum { .. } => {
            let target = ABSOLUTE_MIN_LIQUIDITY_USD.max(profile.min_liquidity_usd);
            Some(format!(
                "Liquidity of at least ${:.0} would satisfy the liquidity rules",
                target
            ))
        }
        DecisionReason::CategoryAtBlockingThreshold {
            category, threshold, ..
        } => Some(format!(
            "A {} score below {:.1} would pass its blocking threshold",
            category, threshold
        )),
        DecisionReason::OwnershipNotRenounced => {
            Some("Renouncing contract ownership would satisfy the ownership requirement".to_string())
        }
        DecisionReason::SellTaxAboveMaximum {
            max_sell_tax_percent,
            ..
        } => Some(format!(
            "A sell tax of at most {:.1}% would pass the tax rule",
            max_sell_tax_percent
        )),
        DecisionReason::CriticalChecksFailed { .. } => Some(
            "Evidence from the failed safety-critical checks would lift the failure rule"
                .to_string(),
        ),
        DecisionReason::NoSuccessfulChecks => {
            Some("Any completed check would give the screener evidence to score".to_string())
        }
        DecisionReason::ScoreAtHardBlock { .. } => Some(format!(
            "An overall risk below {:.0} would clear the hard block line",
            HARD_BLOCK_SCORE
        )),
        DecisionReason::ScoreAboveTolerance {
            max_acceptable_risk,
            ..
        } => Some(format!(
            "An overall risk at or below {:.1} would approve the asset",
            max_acceptable_risk
        )),
        DecisionReason::WithinTolerance { .. } => None,
    }
}
