// Decision Engine - ordered rules turning evidence into a verdict
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RiskProfile;
use crate::models::assessment::Decision;
use crate::models::check::{detail_keys, CheckCategory, CheckResult};

/// Liquidity floor in USD below which an asset is blocked under every
/// profile, no matter how permissive.
pub const ABSOLUTE_MIN_LIQUIDITY_USD: f64 = 1_000.0;

/// Overall score at or above which an asset is blocked under every profile.
pub const HARD_BLOCK_SCORE: f64 = 80.0;

/// Number of failed safety-critical checks that blocks on its own.
pub const CRITICAL_FAILURE_LIMIT: usize = 2;

/// Why a rule fired. Reasons carry the values that triggered them so the
/// explanation never has to guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionReason {
    ConfirmedFraud {
        category: CheckCategory,
    },
    TransfersDisabled {
        category: CheckCategory,
    },
    LiquidityBelowAbsoluteFloor {
        liquidity_usd: f64,
    },
    CategoryAtBlockingThreshold {
        category: CheckCategory,
        score: f64,
        threshold: f64,
    },
    OwnershipNotRenounced,
    SellTaxAboveMaximum {
        sell_tax_percent: f64,
        max_sell_tax_percent: f64,
    },
    LiquidityBelowProfileMinimum {
        liquidity_usd: f64,
        min_liquidity_usd: f64,
    },
    CriticalChecksFailed {
        failed: usize,
    },
    NoSuccessfulChecks,
    ScoreAtHardBlock {
        score: f64,
    },
    ScoreAboveTolerance {
        score: f64,
        max_acceptable_risk: f64,
    },
    WithinTolerance {
        score: f64,
        max_acceptable_risk: f64,
    },
}

/// Verdict plus every reason from the rule tier that produced it, in rule
/// order. The first reason is the dominant one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub reasons: Vec<DecisionReason>,
}

impl DecisionOutcome {
    pub fn primary(&self) -> Option<&DecisionReason> {
        self.reasons.first()
    }
}

/// Applies the decision rules in fixed order. Earlier tiers always win:
/// absolute overrides, then profile rules, then the safety-critical
/// failure count, then the overall score against the hard block line and
/// the profile's tolerance.
///
/// Warning results are successful evidence and participate in every tier.
pub fn decide(
    successful: &[CheckResult],
    failed: &[CheckResult],
    overall_score: f64,
    profile: &RiskProfile,
) -> DecisionOutcome {
    let reasons = absolute_overrides(successful);
    if !reasons.is_empty() {
        return block(reasons);
    }

    let reasons = profile_rules(successful, profile);
    if !reasons.is_empty() {
        return block(reasons);
    }

    let critical_failed = failed
        .iter()
        .filter(|result| result.category.is_safety_critical())
        .count();
    if critical_failed >= CRITICAL_FAILURE_LIMIT {
        return block(vec![DecisionReason::CriticalChecksFailed {
            failed: critical_failed,
        }]);
    }

    if overall_score >= HARD_BLOCK_SCORE {
        let mut reasons = Vec::new();
        if successful.is_empty() {
            reasons.push(DecisionReason::NoSuccessfulChecks);
        }
        reasons.push(DecisionReason::ScoreAtHardBlock {
            score: overall_score,
        });
        return block(reasons);
    }

    if overall_score > profile.max_acceptable_risk {
        return DecisionOutcome {
            decision: Decision::Skip,
            reasons: vec![DecisionReason::ScoreAboveTolerance {
                score: overall_score,
                max_acceptable_risk: profile.max_acceptable_risk,
            }],
        };
    }

    DecisionOutcome {
        decision: Decision::Approve,
        reasons: vec![DecisionReason::WithinTolerance {
            score: overall_score,
            max_acceptable_risk: profile.max_acceptable_risk,
        }],
    }
}

fn block(reasons: Vec<DecisionReason>) -> DecisionOutcome {
    debug!(reasons = reasons.len(), "Decision rules blocked the asset");
    DecisionOutcome {
        decision: Decision::Block,
        reasons,
    }
}

/// Profile-independent disqualifiers read straight from check details.
fn absolute_overrides(successful: &[CheckResult]) -> Vec<DecisionReason> {
    let mut reasons = Vec::new();
    for result in successful {
        if result.detail_bool(detail_keys::FRAUD_CONFIRMED) == Some(true) {
            reasons.push(DecisionReason::ConfirmedFraud {
                category: result.category,
            });
        }
        if result.detail_bool(detail_keys::TRANSFERS_DISABLED) == Some(true) {
            reasons.push(DecisionReason::TransfersDisabled {
                category: result.category,
            });
        }
        if let Some(liquidity_usd) = result.detail_f64(detail_keys::LIQUIDITY_USD) {
            if liquidity_usd < ABSOLUTE_MIN_LIQUIDITY_USD {
                reasons.push(DecisionReason::LiquidityBelowAbsoluteFloor { liquidity_usd });
            }
        }
    }
    reasons
}

/// Threshold and requirement rules from the active profile.
fn profile_rules(successful: &[CheckResult], profile: &RiskProfile) -> Vec<DecisionReason> {
    let mut reasons = Vec::new();

    for result in successful {
        if let Some(threshold) = profile.blocking_threshold(result.category) {
            if result.risk_score >= threshold {
                reasons.push(DecisionReason::CategoryAtBlockingThreshold {
                    category: result.category,
                    score: result.risk_score,
                    threshold,
                });
            }
        }
    }

    if profile.require_ownership_renounced {
        for result in successful {
            if result.category == CheckCategory::Ownership
                && result.detail_bool(detail_keys::OWNERSHIP_RENOUNCED) == Some(false)
            {
                reasons.push(DecisionReason::OwnershipNotRenounced);
            }
        }
    }

    for result in successful {
        if let Some(sell_tax) = result.detail_f64(detail_keys::SELL_TAX_PERCENT) {
            if sell_tax > profile.max_sell_tax_percent {
                reasons.push(DecisionReason::SellTaxAboveMaximum {
                    sell_tax_percent: sell_tax,
                    max_sell_tax_percent: profile.max_sell_tax_percent,
                });
            }
        }
    }

    for result in successful {
        if let Some(liquidity_usd) = result.detail_f64(detail_keys::LIQUIDITY_USD) {
            if liquidity_usd < profile.min_liquidity_usd {
                reasons.push(DecisionReason::LiquidityBelowProfileMinimum {
                    liquidity_usd,
                    min_liquidity_usd: profile.min_liquidity_usd,
                });
            }
        }
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clean(category: CheckCategory, score: f64) -> CheckResult {
        CheckResult::completed(category, score, 0.9, json!({}))
    }

    fn typical_clean_run() -> Vec<CheckResult> {
        vec![
            CheckResult::completed(
                CheckCategory::FraudDetection,
                5.0,
                0.95,
                json!({ "fraud_confirmed": false, "transfers_disabled": false }),
            ),
            CheckResult::completed(
                CheckCategory::Liquidity,
                10.0,
                0.9,
                json!({ "liquidity_usd": 120_000.0 }),
            ),
            CheckResult::completed(
                CheckCategory::Ownership,
                5.0,
                0.9,
                json!({ "ownership_renounced": true }),
            ),
            CheckResult::completed(
                CheckCategory::TaxAnalysis,
                8.0,
                0.9,
                json!({ "sell_tax_percent": 3.0, "buy_tax_percent": 1.0 }),
            ),
        ]
    }

    #[test]
    fn clean_run_is_approved() {
        let profile = RiskProfile::conservative();
        let outcome = decide(&typical_clean_run(), &[], 7.0, &profile);
        assert_eq!(outcome.decision, Decision::Approve);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::WithinTolerance { .. })
        ));
    }

    #[test]
    fn confirmed_fraud_blocks_regardless_of_score() {
        let profile = RiskProfile::aggressive();
        let results = vec![CheckResult::completed(
            CheckCategory::FraudDetection,
            5.0,
            0.99,
            json!({ "fraud_confirmed": true }),
        )];
        let outcome = decide(&results, &[], 5.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::ConfirmedFraud { .. })
        ));
    }

    #[test]
    fn confirmed_fraud_blocks_from_any_category() {
        // the signal counts no matter which provider surfaced it: here the
        // liquidity check reports the honeypot alongside healthy liquidity
        let profile = RiskProfile::moderate();
        let results = vec![CheckResult::completed(
            CheckCategory::Liquidity,
            10.0,
            0.9,
            json!({ "fraud_confirmed": true, "liquidity_usd": 50_000.0 }),
        )];
        let outcome = decide(&results, &[], 10.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::ConfirmedFraud {
                category: CheckCategory::Liquidity
            })
        ));
    }

    #[test]
    fn disabled_transfers_block_from_any_category() {
        let profile = RiskProfile::aggressive();
        let results = vec![CheckResult::completed(
            CheckCategory::TaxAnalysis,
            10.0,
            0.9,
            json!({ "transfers_disabled": true }),
        )];
        let outcome = decide(&results, &[], 10.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::TransfersDisabled {
                category: CheckCategory::TaxAnalysis
            })
        ));
    }

    #[test]
    fn liquidity_below_absolute_floor_blocks_every_profile() {
        for profile in [
            RiskProfile::conservative(),
            RiskProfile::moderate(),
            RiskProfile::aggressive(),
        ] {
            let results = vec![CheckResult::completed(
                CheckCategory::Liquidity,
                15.0,
                0.9,
                json!({ "liquidity_usd": 800.0 }),
            )];
            let outcome = decide(&results, &[], 15.0, &profile);
            assert_eq!(outcome.decision, Decision::Block);
            assert!(matches!(
                outcome.primary(),
                Some(DecisionReason::LiquidityBelowAbsoluteFloor { .. })
            ));
        }
    }

    #[test]
    fn absolute_override_outranks_profile_rules() {
        // Low liquidity USD plus a category score over threshold: the
        // absolute reason must come out first.
        let profile = RiskProfile::conservative();
        let results = vec![
            CheckResult::completed(
                CheckCategory::FraudDetection,
                95.0,
                0.9,
                json!({ "fraud_confirmed": true }),
            ),
            CheckResult::completed(
                CheckCategory::Liquidity,
                20.0,
                0.9,
                json!({ "liquidity_usd": 60_000.0 }),
            ),
        ];
        let outcome = decide(&results, &[], 60.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::ConfirmedFraud { .. })
        ));
    }

    #[test]
    fn category_score_at_threshold_blocks() {
        let profile = RiskProfile::conservative();
        let mut results = typical_clean_run();
        results[0].risk_score = 60.0; // conservative fraud threshold is exactly 60
        let outcome = decide(&results, &[], 25.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::CategoryAtBlockingThreshold {
                category: CheckCategory::FraudDetection,
                ..
            })
        ));
    }

    #[test]
    fn warning_results_still_trigger_thresholds() {
        let profile = RiskProfile::conservative();
        let results = vec![CheckResult::warning(
            CheckCategory::FraudDetection,
            65.0,
            0.4,
            json!({}),
        )];
        let outcome = decide(&results, &[], 20.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
    }

    #[test]
    fn ownership_requirement_only_binds_when_profile_asks() {
        let results = vec![
            clean(CheckCategory::FraudDetection, 5.0),
            CheckResult::completed(
                CheckCategory::Ownership,
                10.0,
                0.9,
                json!({ "ownership_renounced": false }),
            ),
        ];

        let outcome = decide(&results, &[], 6.0, &RiskProfile::conservative());
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::OwnershipNotRenounced)
        ));

        let outcome = decide(&results, &[], 6.0, &RiskProfile::moderate());
        assert_eq!(outcome.decision, Decision::Approve);
    }

    #[test]
    fn sell_tax_over_profile_maximum_blocks() {
        let profile = RiskProfile::moderate();
        let results = vec![CheckResult::completed(
            CheckCategory::TaxAnalysis,
            30.0,
            0.9,
            json!({ "sell_tax_percent": 18.0 }),
        )];
        let outcome = decide(&results, &[], 30.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::SellTaxAboveMaximum { .. })
        ));

        // exactly at the maximum passes
        let results = vec![CheckResult::completed(
            CheckCategory::TaxAnalysis,
            30.0,
            0.9,
            json!({ "sell_tax_percent": 15.0 }),
        )];
        let outcome = decide(&results, &[], 30.0, &profile);
        assert_eq!(outcome.decision, Decision::Approve);
    }

    #[test]
    fn liquidity_below_profile_minimum_blocks() {
        let profile = RiskProfile::conservative();
        let results = vec![CheckResult::completed(
            CheckCategory::Liquidity,
            10.0,
            0.9,
            json!({ "liquidity_usd": 20_000.0 }),
        )];
        let outcome = decide(&results, &[], 10.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::LiquidityBelowProfileMinimum { .. })
        ));

        // the same liquidity is fine for the aggressive profile
        let outcome = decide(&results, &[], 10.0, &RiskProfile::aggressive());
        assert_eq!(outcome.decision, Decision::Approve);
    }

    #[test]
    fn two_failed_critical_checks_block() {
        let profile = RiskProfile::aggressive();
        let successful = vec![clean(CheckCategory::Ownership, 10.0)];
        let failed = vec![
            CheckResult::failed(CheckCategory::FraudDetection, "provider down"),
            CheckResult::failed(CheckCategory::Liquidity, "provider down"),
        ];
        let outcome = decide(&successful, &failed, 40.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::CriticalChecksFailed { failed: 2 })
        ));

        // one failed critical check alone does not
        let failed = vec![CheckResult::failed(CheckCategory::FraudDetection, "down")];
        let outcome = decide(&successful, &failed, 40.0, &profile);
        assert_ne!(outcome.decision, Decision::Block);
    }

    #[test]
    fn hard_block_score_blocks_even_aggressive() {
        let profile = RiskProfile::aggressive();
        let results = vec![clean(CheckCategory::Ownership, 82.0)];
        let outcome = decide(&results, &[], 82.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::ScoreAtHardBlock { .. })
        ));
    }

    #[test]
    fn no_successful_checks_blocks_with_explicit_reason() {
        let profile = RiskProfile::moderate();
        let failed = vec![CheckResult::failed(CheckCategory::Ownership, "down")];
        let outcome = decide(&[], &failed, 100.0, &profile);
        assert_eq!(outcome.decision, Decision::Block);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::NoSuccessfulChecks)
        ));
    }

    #[test]
    fn score_between_tolerance_and_hard_block_skips() {
        let profile = RiskProfile::conservative(); // tolerance 30
        let results = vec![clean(CheckCategory::Ownership, 45.0)];
        let outcome = decide(&results, &[], 45.0, &profile);
        assert_eq!(outcome.decision, Decision::Skip);
        assert!(matches!(
            outcome.primary(),
            Some(DecisionReason::ScoreAboveTolerance { .. })
        ));

        // exactly at tolerance is approved
        let outcome = decide(&results, &[], 30.0, &profile);
        assert_eq!(outcome.decision, Decision::Approve);
    }

    #[test]
    fn stricter_profile_never_yields_weaker_verdict() {
        // Same evidence, mid risk: aggressive approves, conservative skips.
        let results = vec![
            CheckResult::completed(
                CheckCategory::FraudDetection,
                40.0,
                0.9,
                json!({ "fraud_confirmed": false }),
            ),
            CheckResult::completed(
                CheckCategory::Liquidity,
                40.0,
                0.9,
                json!({ "liquidity_usd": 75_000.0 }),
            ),
        ];
        let aggressive = decide(&results, &[], 40.0, &RiskProfile::aggressive());
        let conservative = decide(&results, &[], 40.0, &RiskProfile::conservative());
        assert_eq!(aggressive.decision, Decision::Approve);
        assert_eq!(conservative.decision, Decision::Skip);
    }

    #[test]
    fn missing_details_trigger_nothing() {
        // No liquidity_usd, no tax figures, no flags: only score rules apply.
        let profile = RiskProfile::conservative();
        let results = vec![
            clean(CheckCategory::FraudDetection, 5.0),
            clean(CheckCategory::Liquidity, 10.0),
        ];
        let outcome = decide(&results, &[], 7.0, &profile);
        assert_eq!(outcome.decision, Decision::Approve);
    }
}
