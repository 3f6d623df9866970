// Bulk Screening - fixed-size batches over the single-asset pipeline
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::EngineSettings;
use crate::engine::coordinator::{AssessOptions, ScreeningEngine};
use crate::error::ScreenerError;
use crate::models::assessment::{Assessment, AssessmentState, Decision, RiskLevel};
use crate::models::events::{RiskEvent, RiskEventType};

/// One asset to screen in a bulk call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRef {
    pub token_address: String,
    pub pair_address: String,
}

impl AssetRef {
    pub fn new(token_address: impl Into<String>, pair_address: impl Into<String>) -> Self {
        Self {
            token_address: token_address.into(),
            pair_address: pair_address.into(),
        }
    }
}

/// Knobs for one bulk call. Batches always run one after another; the
/// flag controls whether items inside a batch run concurrently.
#[derive(Debug, Clone)]
pub struct BulkOptions {
    pub batch_size: usize,
    pub parallel_batches: bool,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            parallel_batches: true,
        }
    }
}

impl BulkOptions {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            batch_size: settings.batch.batch_size,
            parallel_batches: true,
        }
    }
}

/// Aggregate outcome of one bulk call. Assessments keep input order;
/// failure placeholders count as blocked and are also counted in
/// `failed`.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSummary {
    pub profile_name: String,
    pub total_assets: usize,
    pub batch_count: usize,
    pub approved: usize,
    pub skipped: usize,
    pub blocked: usize,
    /// Assets whose screening could not run at all.
    pub failed: usize,
    pub by_risk_level: HashMap<RiskLevel, usize>,
    pub average_risk_score: f64,
    pub average_confidence: f64,
    /// Cache hits observed during this bulk call.
    pub cache_hits: u64,
    pub total_time_ms: u64,
    /// Short narrative lines summarizing the run.
    pub insights: Vec<String>,
    pub assessments: Vec<Assessment>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BulkSummary {
    fn empty(profile_name: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            profile_name: profile_name.to_string(),
            total_assets: 0,
            batch_count: 0,
            approved: 0,
            skipped: 0,
            blocked: 0,
            failed: 0,
            by_risk_level: HashMap::new(),
            average_risk_score: 0.0,
            average_confidence: 0.0,
            cache_hits: 0,
            total_time_ms: 0,
            insights: Vec::new(),
            assessments: Vec::new(),
            started_at,
            completed_at: Utc::now(),
        }
    }
}

impl ScreeningEngine {
    /// Screens many assets under one profile in fixed-size batches.
    ///
    /// Only caller errors (unknown profile) fail the call. A malformed
    /// item or an aborted batch degrades into block placeholders so the
    /// rest of the run still completes.
    pub async fn bulk_assess(
        self: &Arc<Self>,
        assets: &[AssetRef],
        profile_name: &str,
        options: &BulkOptions,
    ) -> Result<BulkSummary, ScreenerError> {
        let started = Instant::now();
        let started_at = Utc::now();

        let profile = self
            .profiles()
            .get(profile_name)
            .await
            .ok_or_else(|| ScreenerError::UnknownProfile {
                name: profile_name.to_string(),
            })?;

        if assets.is_empty() {
            return Ok(BulkSummary::empty(&profile.name, started_at));
        }

        let batch_size = options.batch_size.max(1);
        let cache_hits_before = self.cache_stats().hits;

        info!(
            profile = %profile.name,
            assets = assets.len(),
            batch_size,
            parallel = options.parallel_batches,
            "Starting bulk screening"
        );

        let mut assessments: Vec<Assessment> = Vec::with_capacity(assets.len());
        let mut batch_count = 0usize;
        let mut slowest_batch = 0usize;
        let mut slowest_batch_ms = 0u64;

        for (index, chunk) in assets.chunks(batch_size).enumerate() {
            batch_count += 1;
            let engine = Arc::clone(self);
            let batch: Vec<AssetRef> = chunk.to_vec();
            let batch_profile = profile.name.clone();
            let parallel = options.parallel_batches;
            let batch_started = Instant::now();

            let outcome = tokio::spawn(async move {
                engine.run_bulk_batch(batch, batch_profile, parallel).await
            })
            .await;

            let elapsed_ms = batch_started.elapsed().as_millis() as u64;
            if elapsed_ms > slowest_batch_ms {
                slowest_batch_ms = elapsed_ms;
                slowest_batch = index;
            }

            match outcome {
                Ok(results) => assessments.extend(results),
                Err(e) => {
                    error!(batch = index, error = %e, "Bulk batch aborted");
                    for asset in chunk {
                        assessments.push(failure_placeholder(
                            asset,
                            &profile.name,
                            &format!("batch {} aborted: {}", index, e),
                        ));
                    }
                }
            }
        }

        let summary = self
            .summarize(
                &profile.name,
                assessments,
                batch_count,
                slowest_batch,
                slowest_batch_ms,
                cache_hits_before,
                started,
                started_at,
            )
            .await;

        info!(
            profile = %summary.profile_name,
            total = summary.total_assets,
            approved = summary.approved,
            skipped = summary.skipped,
            blocked = summary.blocked,
            elapsed_ms = summary.total_time_ms,
            "Bulk screening complete"
        );

        Ok(summary)
    }

    async fn run_bulk_batch(
        self: Arc<Self>,
        batch: Vec<AssetRef>,
        profile_name: String,
        parallel: bool,
    ) -> Vec<Assessment> {
        let options = AssessOptions::default();
        if parallel {
            let items = batch
                .iter()
                .map(|asset| self.screen_or_placeholder(asset, &profile_name, &options));
            join_all(items).await
        } else {
            let mut results = Vec::with_capacity(batch.len());
            for asset in &batch {
                results.push(
                    self.screen_or_placeholder(asset, &profile_name, &options)
                        .await,
                );
            }
            results
        }
    }

    async fn screen_or_placeholder(
        &self,
        asset: &AssetRef,
        profile_name: &str,
        options: &AssessOptions,
    ) -> Assessment {
        match self
            .assess_with_options(&asset.token_address, &asset.pair_address, profile_name, options)
            .await
        {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!(
                    token = %asset.token_address,
                    error = %e,
                    "Bulk item could not be screened, blocking it"
                );
                failure_placeholder(asset, profile_name, &e.to_string())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn summarize(
        &self,
        profile_name: &str,
        assessments: Vec<Assessment>,
        batch_count: usize,
        slowest_batch: usize,
        slowest_batch_ms: u64,
        cache_hits_before: u64,
        started: Instant,
        started_at: DateTime<Utc>,
    ) -> BulkSummary {
        let total_assets = assessments.len();
        let mut approved = 0usize;
        let mut skipped = 0usize;
        let mut blocked = 0usize;
        let mut failed = 0usize;
        let mut by_risk_level: HashMap<RiskLevel, usize> = HashMap::new();
        let mut score_sum = 0.0;
        let mut confidence_sum = 0.0;
        let mut block_reasons: HashMap<String, usize> = HashMap::new();

        for assessment in &assessments {
            match assessment.decision {
                Decision::Approve => approved += 1,
                Decision::Skip => skipped += 1,
                Decision::Block => blocked += 1,
            }
            if is_failure_placeholder(assessment) {
                failed += 1;
            }
            *by_risk_level.entry(assessment.risk_level).or_insert(0) += 1;
            score_sum += assessment.overall_risk_score;
            confidence_sum += assessment.confidence;

            if assessment.decision == Decision::Block {
                if let Some(signal) = assessment.signals.first() {
                    *block_reasons.entry(signal.headline.clone()).or_insert(0) += 1;
                }
            }
        }

        let count = total_assets as f64;
        let average_risk_score = if total_assets == 0 { 0.0 } else { score_sum / count };
        let average_confidence = if total_assets == 0 {
            0.0
        } else {
            confidence_sum / count
        };

        let mut insights = Vec::new();
        insights.push(format!(
            "Approved {} of {} assets ({:.0}%)",
            approved,
            total_assets,
            if total_assets == 0 {
                0.0
            } else {
                approved as f64 / count * 100.0
            }
        ));
        if let Some((reason, occurrences)) = block_reasons
            .into_iter()
            .max_by_key(|(_, occurrences)| *occurrences)
        {
            insights.push(format!(
                "Most common block reason ({}x): {}",
                occurrences, reason
            ));
        }
        if failed > 0 {
            insights.push(format!(
                "{} assets could not be screened and were blocked",
                failed
            ));
        }
        if batch_count > 1 {
            insights.push(format!(
                "Slowest batch: #{} at {}ms",
                slowest_batch + 1,
                slowest_batch_ms
            ));
        }

        let total_time_ms = started.elapsed().as_millis() as u64;
        let cache_hits = self.cache_stats().hits.saturating_sub(cache_hits_before);

        let event = RiskEvent::new(
            RiskEventType::BulkCompleted,
            RiskLevel::from_score(average_risk_score),
            "*",
            profile_name,
            json!({
                "total_assets": total_assets,
                "approved": approved,
                "skipped": skipped,
                "blocked": blocked,
                "failed": failed,
                "total_time_ms": total_time_ms,
            }),
        );
        self.record_event_nonfatal(event).await;

        BulkSummary {
            profile_name: profile_name.to_string(),
            total_assets,
            batch_count,
            approved,
            skipped,
            blocked,
            failed,
            by_risk_level,
            average_risk_score,
            average_confidence,
            cache_hits,
            total_time_ms,
            insights,
            assessments,
            started_at,
            completed_at: Utc::now(),
        }
    }
}

/// Decided block placeholder for an item that never reached the pipeline.
fn failure_placeholder(asset: &AssetRef, profile_name: &str, reason: &str) -> Assessment {
    let mut assessment =
        Assessment::pending(&asset.token_address, &asset.pair_address, profile_name);
    assessment.state = AssessmentState::Decided;
    assessment.overall_risk_score = 100.0;
    assessment.risk_level = RiskLevel::Critical;
    assessment.decision = Decision::Block;
    assessment.confidence = 0.0;
    assessment.rationale = format!("BLOCK: screening could not run ({}).", reason);
    assessment.completed_at = Some(Utc::now());
    assessment
}

/// Placeholders are the only decided assessments with zero checks.
fn is_failure_placeholder(assessment: &Assessment) -> bool {
    assessment.decision == Decision::Block && assessment.total_checks() == 0
}
