use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::time::Duration;

use token_risk_screener::engine::confidence;
use token_risk_screener::engine::decision::decide;
use token_risk_screener::engine::explainability::build_explanation;
use token_risk_screener::engine::scoring::overall_score;
use token_risk_screener::models::detail_keys;
use token_risk_screener::{CheckCategory, CheckResult, RiskProfile};

fn successful_results() -> Vec<CheckResult> {
    vec![
        CheckResult::completed(
            CheckCategory::FraudDetection,
            12.0,
            0.95,
            json!({
                detail_keys::FRAUD_CONFIRMED: false,
                detail_keys::TRANSFERS_DISABLED: false,
            }),
        ),
        CheckResult::completed(
            CheckCategory::Liquidity,
            18.0,
            0.9,
            json!({ detail_keys::LIQUIDITY_USD: 85_000.0 }),
        ),
        CheckResult::completed(
            CheckCategory::Ownership,
            25.0,
            0.85,
            json!({ detail_keys::OWNERSHIP_RENOUNCED: true }),
        ),
        CheckResult::completed(
            CheckCategory::TaxAnalysis,
            30.0,
            0.9,
            json!({ detail_keys::SELL_TAX_PERCENT: 9.0 }),
        ),
        CheckResult::completed(CheckCategory::HolderDistribution, 40.0, 0.8, json!({})),
        CheckResult::warning(CheckCategory::MarketSentiment, 35.0, 0.4, json!({})),
    ]
}

fn failed_results() -> Vec<CheckResult> {
    vec![
        CheckResult::timed_out(CheckCategory::Liquidity, Duration::from_secs(10)),
        CheckResult::failed(CheckCategory::HolderDistribution, "provider unreachable"),
    ]
}

fn benchmark_overall_score(c: &mut Criterion) {
    let results = successful_results();

    c.bench_function("overall_score_six_checks", |b| {
        b.iter(|| overall_score(black_box(&results)))
    });
}

fn benchmark_confidence(c: &mut Criterion) {
    let successful = successful_results();
    let failed = failed_results();
    let budget = Duration::from_secs(10);

    c.bench_function("confidence_estimate", |b| {
        b.iter(|| confidence::estimate(black_box(&successful), black_box(&failed), black_box(budget)))
    });
}

fn benchmark_decision(c: &mut Criterion) {
    let successful = successful_results();
    let no_failures: Vec<CheckResult> = Vec::new();
    let profile = RiskProfile::moderate();
    let score = overall_score(&successful);

    c.bench_function("decide_moderate_clean", |b| {
        b.iter(|| {
            decide(
                black_box(&successful),
                black_box(&no_failures),
                black_box(score),
                black_box(&profile),
            )
        })
    });
}

fn benchmark_explanation(c: &mut Criterion) {
    // worst case: a conservative block with several fired rules
    let profile = RiskProfile::conservative();
    let successful = vec![
        CheckResult::completed(
            CheckCategory::FraudDetection,
            72.0,
            0.9,
            json!({ detail_keys::FRAUD_CONFIRMED: false }),
        ),
        CheckResult::completed(
            CheckCategory::Liquidity,
            75.0,
            0.9,
            json!({ detail_keys::LIQUIDITY_USD: 4_000.0 }),
        ),
        CheckResult::completed(
            CheckCategory::TaxAnalysis,
            71.0,
            0.9,
            json!({ detail_keys::SELL_TAX_PERCENT: 32.0 }),
        ),
    ];
    let failed = failed_results();
    let score = overall_score(&successful);
    let outcome = decide(&successful, &failed, score, &profile);

    c.bench_function("build_explanation_blocked", |b| {
        b.iter(|| {
            build_explanation(
                black_box(&outcome),
                black_box(&successful),
                black_box(&failed),
                black_box(score),
                black_box(&profile),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_overall_score,
    benchmark_confidence,
    benchmark_decision,
    benchmark_explanation
);
criterion_main!(benches);
