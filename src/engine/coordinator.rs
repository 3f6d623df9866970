// Screening Engine - coordinates checks, scoring, decision, and caching
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::checks::{CheckRegistry, RiskCheck};
use crate::config::{EngineSettings, ProfileRegistry, RiskProfile};
use crate::engine::{confidence, decision, explainability, scoring};
use crate::error::{retry_check, with_timeout, RetryConfig, ScreenerError};
use crate::models::assessment::{Assessment, AssessmentState, Decision, RiskLevel};
use crate::models::check::{CheckCategory, CheckContext, CheckResult};
use crate::models::events::RiskEvent;
use crate::storage::{AssessmentStore, NoopStore};
use crate::utils::caching::{AssessmentCache, CacheConfig, CacheStats};
use crate::utils::validation::InputValidator;

/// Per-call knobs for one assessment.
#[derive(Debug, Clone)]
pub struct AssessOptions {
    /// Run selected checks concurrently; sequential mode exists for
    /// debugging and rate-limited providers.
    pub parallel: bool,
    /// Include the profile's optional checks alongside the required ones.
    pub include_optional: bool,
    /// Skip the cache lookup and overwrite any cached entry.
    pub force_refresh: bool,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            include_optional: true,
            force_refresh: false,
        }
    }
}

/// Lifetime counters for one engine instance.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub assessments_run: u64,
    pub approved: u64,
    pub skipped: u64,
    pub blocked: u64,
    pub checks_registered: usize,
    pub cache: CacheStats,
}

/// Pre-trade screening engine.
///
/// One engine holds the check registry, profile registry, assessment
/// cache, and persistence hooks, and is shared across callers behind an
/// `Arc`. All state it mutates is interior.
pub struct ScreeningEngine {
    checks: Arc<CheckRegistry>,
    profiles: Arc<ProfileRegistry>,
    cache: AssessmentCache,
    store: Arc<dyn AssessmentStore>,
    settings: EngineSettings,
    validator: InputValidator,
    assessments_run: AtomicU64,
    approved: AtomicU64,
    skipped: AtomicU64,
    blocked: AtomicU64,
}

impl ScreeningEngine {
    /// Engine with the builtin profiles and no persistence.
    pub fn new(checks: CheckRegistry, settings: EngineSettings) -> Self {
        Self::with_store(checks, Arc::new(NoopStore), settings)
    }

    pub fn with_store(
        checks: CheckRegistry,
        store: Arc<dyn AssessmentStore>,
        settings: EngineSettings,
    ) -> Self {
        let cache = AssessmentCache::new(CacheConfig {
            enabled: settings.cache.enabled,
            ttl: settings.cache_ttl(),
            max_capacity: settings.cache.max_capacity,
        });

        info!(
            checks = checks.len(),
            default_profile = %settings.default_profile,
            "Screening engine initialized"
        );

        Self {
            checks: Arc::new(checks),
            profiles: Arc::new(ProfileRegistry::with_builtins()),
            cache,
            store,
            settings,
            validator: InputValidator::new(),
            assessments_run: AtomicU64::new(0),
            approved: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        }
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn checks(&self) -> &CheckRegistry {
        &self.checks
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Screens one asset under the named profile with default options.
    pub async fn assess(
        &self,
        token_address: &str,
        pair_address: &str,
        profile_name: &str,
    ) -> Result<Assessment, ScreenerError> {
        self.assess_with_options(token_address, pair_address, profile_name, &AssessOptions::default())
            .await
    }

    /// Screens one asset: validate, consult the cache, fan the selected
    /// checks out under the profile deadline, aggregate, decide, explain,
    /// then cache and persist the outcome.
    pub async fn assess_with_options(
        &self,
        token_address: &str,
        pair_address: &str,
        profile_name: &str,
        options: &AssessOptions,
    ) -> Result<Assessment, ScreenerError> {
        let started = Instant::now();
        let token = self.validator.validate_address(token_address)?;
        let pair = self.validator.validate_address(pair_address)?;

        let profile = self
            .profiles
            .get(profile_name)
            .await
            .ok_or_else(|| ScreenerError::UnknownProfile {
                name: profile_name.to_string(),
            })?;

        let cache_key = AssessmentCache::key(&token, &pair, &profile.name);
        if !options.force_refresh {
            if let Some(cached) = self.cache.get(&cache_key).await {
                debug!(token = %token, profile = %profile.name, "Serving cached assessment");
                let mut assessment = (*cached).clone();
                assessment.from_cache = true;
                return Ok(assessment);
            }
        }

        let selected = profile.selected_checks(options.include_optional);
        let mut assessment = Assessment::pending(&token, &pair, &profile.name);
        if let Err(e) = self.store.create_assessment(&assessment).await {
            warn!(
                assessment_id = %assessment.id,
                error = %e,
                "Assessment creation hook failed"
            );
            assessment.persistence_error = Some(e.to_string());
        }

        info!(
            token = %token,
            pair = %pair,
            profile = %profile.name,
            checks = selected.len(),
            parallel = options.parallel,
            "Starting risk assessment"
        );

        let deadline = started + Duration::from_secs(profile.timeout_seconds);
        let results = if options.parallel {
            self.run_checks_parallel(&token, &pair, &profile, &selected, deadline)
                .await
        } else {
            self.run_checks_sequential(&token, &pair, &profile, &selected, deadline)
                .await
        };

        let (successful, failed): (Vec<CheckResult>, Vec<CheckResult>) =
            results.into_iter().partition(CheckResult::is_successful);

        let overall = scoring::overall_score(&successful);
        let estimated_confidence =
            confidence::estimate(&successful, &failed, self.settings.check_timeout());

        assessment.state = AssessmentState::Aggregated;
        assessment.overall_risk_score = overall;
        assessment.risk_level = RiskLevel::from_score(overall);
        assessment.confidence = estimated_confidence;

        let outcome = decision::decide(&successful, &failed, overall, &profile);
        let explanation =
            explainability::build_explanation(&outcome, &successful, &failed, overall, &profile);

        assessment.state = AssessmentState::Decided;
        assessment.decision = outcome.decision;
        assessment.successful_checks = successful;
        assessment.failed_checks = failed;
        assessment.rationale = explanation.narrative;
        assessment.signals = explanation.signals;
        assessment.counterfactuals = explanation.counterfactuals;
        assessment.completed_at = Some(Utc::now());
        assessment.expires_at =
            Some(Utc::now() + chrono::Duration::seconds(self.settings.cache.ttl_seconds as i64));
        assessment.execution_time_ms = started.elapsed().as_millis() as u64;

        self.persist_outcome(&mut assessment).await;
        self.cache.insert(Arc::new(assessment.clone())).await;

        self.assessments_run.fetch_add(1, Ordering::Relaxed);
        match assessment.decision {
            Decision::Approve => self.approved.fetch_add(1, Ordering::Relaxed),
            Decision::Skip => self.skipped.fetch_add(1, Ordering::Relaxed),
            Decision::Block => self.blocked.fetch_add(1, Ordering::Relaxed),
        };

        info!(
            token = %token,
            profile = %profile.name,
            decision = %assessment.decision,
            score = %format!("{:.1}", assessment.overall_risk_score),
            confidence = %format!("{:.0}", assessment.confidence),
            elapsed_ms = assessment.execution_time_ms,
            "Risk assessment complete"
        );

        Ok(assessment)
    }

    /// Spawns one task per selected check so a hung provider cannot stall
    /// its siblings, then collects everything into the uniform envelope.
    /// Categories without a registered check become failed placeholders.
    async fn run_checks_parallel(
        &self,
        token: &str,
        pair: &str,
        profile: &RiskProfile,
        selected: &[CheckCategory],
        deadline: Instant,
    ) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(selected.len());
        let mut tasks = Vec::new();

        for &category in selected {
            let Some(check) = self.checks.get(category) else {
                if let Some(placeholder) = self.missing_check_placeholder(category, profile) {
                    results.push(placeholder);
                }
                continue;
            };
            let declared_weight = check.default_weight();
            let retry = self.retry_policy(check.as_ref());
            let budget = self.check_budget(check.as_ref());
            let ctx = CheckContext::new(token, pair, budget);
            let task = tokio::spawn(async move {
                execute_check(check, ctx, retry, deadline).await
            });
            tasks.push((category, declared_weight, task));
        }

        for (category, declared_weight, task) in tasks {
            match task.await {
                Ok(result) => {
                    results.push(self.resolve_weight(result, profile, Some(declared_weight)))
                }
                Err(e) => {
                    error!(category = %category, error = %e, "Check task aborted");
                    results.push(self.resolve_weight(
                        CheckResult::failed(category, format!("check task aborted: {}", e)),
                        profile,
                        Some(declared_weight),
                    ));
                }
            }
        }
        results
    }

    /// Runs the selected checks one at a time in profile order, still
    /// honoring the overall deadline.
    async fn run_checks_sequential(
        &self,
        token: &str,
        pair: &str,
        profile: &RiskProfile,
        selected: &[CheckCategory],
        deadline: Instant,
    ) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(selected.len());

        for &category in selected {
            let Some(check) = self.checks.get(category) else {
                if let Some(placeholder) = self.missing_check_placeholder(category, profile) {
                    results.push(placeholder);
                }
                continue;
            };
            let declared_weight = check.default_weight();
            if Instant::now() >= deadline {
                warn!(category = %category, "Assessment deadline exhausted before check ran");
                results.push(self.resolve_weight(
                    deadline_exhausted(category, Duration::ZERO),
                    profile,
                    Some(declared_weight),
                ));
                continue;
            }
            let retry = self.retry_policy(check.as_ref());
            let budget = self.check_budget(check.as_ref());
            let ctx = CheckContext::new(token, pair, budget);
            let result = execute_check(check, ctx, retry, deadline).await;
            results.push(self.resolve_weight(result, profile, Some(declared_weight)));
        }
        results
    }

    /// A required category with no registered check fails the category
    /// outright; an unregistered optional category is simply skipped.
    fn missing_check_placeholder(
        &self,
        category: CheckCategory,
        profile: &RiskProfile,
    ) -> Option<CheckResult> {
        if profile.required_checks.contains(&category) {
            warn!(category = %category, "No check registered for required category");
            Some(self.resolve_weight(
                CheckResult::failed(category, "no check registered"),
                profile,
                None,
            ))
        } else {
            debug!(category = %category, "Optional category has no registered check");
            None
        }
    }

    /// Check's declared retry count with the engine's backoff shape.
    fn retry_policy(&self, check: &dyn RiskCheck) -> RetryConfig {
        RetryConfig {
            max_retries: check.max_retries(),
            ..self.settings.retry.clone()
        }
    }

    /// Per-attempt budget: the check's declared timeout, capped by the
    /// engine-wide setting.
    fn check_budget(&self, check: &dyn RiskCheck) -> Duration {
        check.timeout().min(self.settings.check_timeout())
    }

    /// Aggregation weight for one result: profile override first, then the
    /// check's declared weight, then the category default. Placeholders for
    /// categories with no check in hand carry no declared weight.
    fn resolve_weight(
        &self,
        result: CheckResult,
        profile: &RiskProfile,
        declared_weight: Option<f64>,
    ) -> CheckResult {
        let weight = profile
            .weight_override(result.category)
            .or(declared_weight)
            .unwrap_or_else(|| result.category.default_weight());
        result.with_weight(weight)
    }

    /// Persistence hooks are observers: their failures are recorded on the
    /// assessment but never fail the screening itself.
    async fn persist_outcome(&self, assessment: &mut Assessment) {
        if let Err(e) = self
            .store
            .save_assessment_result(assessment.id, assessment)
            .await
        {
            warn!(
                assessment_id = %assessment.id,
                error = %e,
                "Assessment persistence hook failed"
            );
            assessment.persistence_error = Some(e.to_string());
        }

        let event = RiskEvent::from_assessment(assessment);
        if let Err(e) = self.store.record_event(event).await {
            warn!(
                assessment_id = %assessment.id,
                error = %e,
                "Event persistence hook failed"
            );
            if assessment.persistence_error.is_none() {
                assessment.persistence_error = Some(e.to_string());
            }
        }
    }

    /// Event hook with the same never-fatal contract as `persist_outcome`.
    pub(crate) async fn record_event_nonfatal(&self, event: RiskEvent) {
        if let Err(e) = self.store.record_event(event).await {
            warn!(error = %e, "Event persistence hook failed");
        }
    }

    /// Drops the cached assessment for one asset and profile.
    pub async fn invalidate(&self, token_address: &str, pair_address: &str, profile_name: &str) {
        let key = AssessmentCache::key(token_address, pair_address, profile_name);
        self.cache.invalidate(&key).await;
        debug!(key = %key, "Cached assessment invalidated");
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            assessments_run: self.assessments_run.load(Ordering::Relaxed),
            approved: self.approved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            checks_registered: self.checks.len(),
            cache: self.cache.stats(),
        }
    }
}

/// Runs one check under its retry policy, bounding every attempt to the
/// per-attempt budget and the whole thing to the assessment deadline.
/// Never returns an error: whatever happens is normalized into the result
/// envelope so one bad provider cannot sink the assessment.
async fn execute_check(
    check: Arc<dyn RiskCheck>,
    ctx: CheckContext,
    retry: RetryConfig,
    deadline: Instant,
) -> CheckResult {
    let category = check.category();
    let started = Instant::now();

    let attempts = retry_check(category, &retry, || {
        let check = check.clone();
        let ctx = ctx.clone();
        async move { with_timeout(category, ctx.budget, check.run(&ctx)).await }
    });

    let outcome = match tokio::time::timeout_at(deadline, attempts).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(category = %category, "Check missed the assessment deadline");
            return deadline_exhausted(category, started.elapsed());
        }
    };

    match outcome {
        Ok(result) => {
            debug!(
                category = %category,
                score = %format!("{:.1}", result.risk_score),
                status = %result.status,
                "Check finished"
            );
            result.with_execution_time(started.elapsed())
        }
        Err(ScreenerError::CheckTimeout { millis, .. }) => {
            warn!(category = %category, millis, "Check timed out");
            CheckResult::timed_out(category, Duration::from_millis(millis))
                .with_execution_time(started.elapsed())
        }
        Err(e) => {
            warn!(category = %category, error = %e, "Check failed");
            CheckResult::failed(category, e.to_string()).with_execution_time(started.elapsed())
        }
    }
}

fn deadline_exhausted(category: CheckCategory, elapsed: Duration) -> CheckResult {
    let mut result = CheckResult::timed_out(category, elapsed);
    result.error = Some("assessment deadline exhausted".to_string());
    result
}
