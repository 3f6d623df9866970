use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::check::{CheckCategory, CheckResult};

/// Severity band derived from an overall risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps a score in [0, 100] to its severity band.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Critical
        } else if score >= 60.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else if score >= 20.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final screening verdict for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Safe to trade under the active profile.
    Approve,
    /// Not disqualified, but too risky for the active profile.
    Skip,
    /// Disqualified; callers should blacklist the asset.
    Block,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Skip => "skip",
            Decision::Block => "block",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assessment lifecycle: created Pending, Aggregated once every check has
/// resolved and the overall score is computed, Decided after the decision
/// rules have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    Pending,
    Aggregated,
    Decided,
}

/// One human-readable risk finding, ordered most severe first in
/// `Assessment::signals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSignal {
    pub category: Option<CheckCategory>,
    pub severity: RiskLevel,
    pub headline: String,
}

/// Complete screening result for one token/pair under one profile.
///
/// Score, level, decision and confidence are provisional until `state`
/// is `Decided`; a pending assessment reads as maximum risk with a Skip
/// verdict so that nothing downstream can mistake it for an approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub token_address: String,
    pub pair_address: String,
    pub profile_name: String,
    pub state: AssessmentState,
    /// 0 = no risk, 100 = maximum risk.
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub decision: Decision,
    /// 0 to 100 confidence in the overall score.
    pub confidence: f64,
    pub successful_checks: Vec<CheckResult>,
    pub failed_checks: Vec<CheckResult>,
    /// One-paragraph narrative naming the decision and its dominant reason.
    pub rationale: String,
    pub signals: Vec<RiskSignal>,
    /// Up to three minimal changes that would flip the decision.
    pub counterfactuals: Vec<String>,
    /// Set when a persistence hook failed; never fatal to the assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub execution_time_ms: u64,
    /// Whether this result was served from the assessment cache.
    pub from_cache: bool,
}

impl Assessment {
    /// Creates the pending skeleton written before any check runs.
    pub fn pending(
        token_address: impl Into<String>,
        pair_address: impl Into<String>,
        profile_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_address: token_address.into(),
            pair_address: pair_address.into(),
            profile_name: profile_name.into(),
            state: AssessmentState::Pending,
            overall_risk_score: 100.0,
            risk_level: RiskLevel::Critical,
            decision: Decision::Skip,
            confidence: 0.0,
            successful_checks: Vec::new(),
            failed_checks: Vec::new(),
            rationale: String::new(),
            signals: Vec::new(),
            counterfactuals: Vec::new(),
            persistence_error: None,
            created_at: Utc::now(),
            completed_at: None,
            expires_at: None,
            execution_time_ms: 0,
            from_cache: false,
        }
    }

    /// True while the cached result may still be served.
    pub fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(expires) => Utc::now() < expires,
            None => false,
        }
    }

    pub fn total_checks(&self) -> usize {
        self.successful_checks.len() + self.failed_checks.len()
    }

    /// Check result for a category, successful or failed.
    pub fn check(&self, category: CheckCategory) -> Option<&CheckResult> {
        self.successful_checks
            .iter()
            .chain(self.failed_checks.iter())
            .find(|r| r.category == category)
    }
}
