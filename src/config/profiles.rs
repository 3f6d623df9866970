use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::ScreenerError;
use crate::models::check::CheckCategory;

/// Profile document schema version accepted by this build.
pub const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Threshold applied to blocking-flagged categories that a profile leaves
/// unlisted, so a partial profile cannot silently disable fraud or
/// liquidity blocking.
pub const DEFAULT_BLOCKING_THRESHOLD: f64 = 90.0;

fn default_schema_version() -> u32 {
    PROFILE_SCHEMA_VERSION
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Risk tolerance profile governing which checks run, how results are
/// weighted, and where the block/skip lines sit.
///
/// Profiles are data: they can be created, stored, and updated at runtime
/// through the registry without touching engine code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    #[serde(default = "default_schema_version")]
    pub version: u32,
    pub name: String,
    pub required_checks: Vec<CheckCategory>,
    #[serde(default)]
    pub optional_checks: Vec<CheckCategory>,
    /// Score at or above which a single category blocks the asset.
    #[serde(default)]
    pub blocking_thresholds: HashMap<CheckCategory, f64>,
    /// Per-category weight overrides; unlisted categories keep defaults.
    #[serde(default)]
    pub weights: HashMap<CheckCategory, f64>,
    pub min_liquidity_usd: f64,
    pub max_sell_tax_percent: f64,
    #[serde(default)]
    pub require_ownership_renounced: bool,
    /// Overall deadline for one assessment.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Overall score above which the asset is SKIPped.
    pub max_acceptable_risk: f64,
}

impl RiskProfile {
    /// Strictest preset: low tolerance, all four core checks required,
    /// ownership renouncement mandatory.
    pub fn conservative() -> Self {
        Self {
            version: PROFILE_SCHEMA_VERSION,
            name: "conservative".to_string(),
            required_checks: vec![
                CheckCategory::FraudDetection,
                CheckCategory::Liquidity,
                CheckCategory::Ownership,
                CheckCategory::TaxAnalysis,
            ],
            optional_checks: vec![
                CheckCategory::HolderDistribution,
                CheckCategory::MarketSentiment,
            ],
            blocking_thresholds: HashMap::from([
                (CheckCategory::FraudDetection, 60.0),
                (CheckCategory::Liquidity, 70.0),
                (CheckCategory::Ownership, 75.0),
                (CheckCategory::TaxAnalysis, 70.0),
            ]),
            weights: HashMap::new(),
            min_liquidity_usd: 50_000.0,
            max_sell_tax_percent: 10.0,
            require_ownership_renounced: true,
            timeout_seconds: 30,
            max_acceptable_risk: 30.0,
        }
    }

    /// Balanced preset for routine screening.
    pub fn moderate() -> Self {
        Self {
            version: PROFILE_SCHEMA_VERSION,
            name: "moderate".to_string(),
            required_checks: vec![
                CheckCategory::FraudDetection,
                CheckCategory::Liquidity,
                CheckCategory::TaxAnalysis,
            ],
            optional_checks: vec![
                CheckCategory::Ownership,
                CheckCategory::HolderDistribution,
                CheckCategory::MarketSentiment,
            ],
            blocking_thresholds: HashMap::from([
                (CheckCategory::FraudDetection, 70.0),
                (CheckCategory::Liquidity, 80.0),
                (CheckCategory::Ownership, 85.0),
                (CheckCategory::TaxAnalysis, 80.0),
            ]),
            weights: HashMap::new(),
            min_liquidity_usd: 10_000.0,
            max_sell_tax_percent: 15.0,
            require_ownership_renounced: false,
            timeout_seconds: 45,
            max_acceptable_risk: 50.0,
        }
    }

    /// Most permissive preset: only the safety-critical checks are
    /// required and tolerance runs high. The absolute block rules still
    /// apply unchanged.
    pub fn aggressive() -> Self {
        Self {
            version: PROFILE_SCHEMA_VERSION,
            name: "aggressive".to_string(),
            required_checks: vec![CheckCategory::FraudDetection, CheckCategory::Liquidity],
            optional_checks: vec![
                CheckCategory::Ownership,
                CheckCategory::TaxAnalysis,
                CheckCategory::HolderDistribution,
                CheckCategory::MarketSentiment,
            ],
            blocking_thresholds: HashMap::from([
                (CheckCategory::FraudDetection, 85.0),
                (CheckCategory::Liquidity, 90.0),
            ]),
            weights: HashMap::new(),
            min_liquidity_usd: 1_000.0,
            max_sell_tax_percent: 25.0,
            require_ownership_renounced: false,
            timeout_seconds: 60,
            max_acceptable_risk: 70.0,
        }
    }

    /// Categories to execute for this profile.
    pub fn selected_checks(&self, include_optional: bool) -> Vec<CheckCategory> {
        let mut selected = self.required_checks.clone();
        if include_optional {
            for category in &self.optional_checks {
                if !selected.contains(category) {
                    selected.push(*category);
                }
            }
        }
        selected
    }

    /// Weight this profile explicitly overrides for a category, if any.
    /// Unlisted categories defer to the check's declared weight, then to
    /// the category default.
    pub fn weight_override(&self, category: CheckCategory) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    /// Blocking threshold for a category, if any applies. Unlisted
    /// blocking-flagged categories fall back to the default threshold.
    pub fn blocking_threshold(&self, category: CheckCategory) -> Option<f64> {
        match self.blocking_thresholds.get(&category) {
            Some(threshold) => Some(*threshold),
            None if category.default_blocking() => Some(DEFAULT_BLOCKING_THRESHOLD),
            None => None,
        }
    }

    /// Range-checks every field. Registries refuse profiles that fail.
    pub fn validate(&self) -> Result<(), ScreenerError> {
        if self.version != PROFILE_SCHEMA_VERSION {
            return Err(self.invalid(format!(
                "unsupported schema version {} (expected {})",
                self.version, PROFILE_SCHEMA_VERSION
            )));
        }
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if self.required_checks.is_empty() {
            return Err(self.invalid("at least one required check is needed"));
        }
        for category in &self.required_checks {
            if self.optional_checks.contains(category) {
                return Err(self.invalid(format!(
                    "check {} listed as both required and optional",
                    category
                )));
            }
        }
        for (category, threshold) in &self.blocking_thresholds {
            if !threshold.is_finite() || *threshold < 0.0 || *threshold > 100.0 {
                return Err(self.invalid(format!(
                    "blocking threshold for {} out of range: {}",
                    category, threshold
                )));
            }
        }
        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(self.invalid(format!(
                    "weight for {} must be a positive number, got {}",
                    category, weight
                )));
            }
        }
        if !self.max_acceptable_risk.is_finite()
            || self.max_acceptable_risk < 0.0
            || self.max_acceptable_risk > 100.0
        {
            return Err(self.invalid(format!(
                "max_acceptable_risk out of range: {}",
                self.max_acceptable_risk
            )));
        }
        if !self.min_liquidity_usd.is_finite() || self.min_liquidity_usd < 0.0 {
            return Err(self.invalid(format!(
                "min_liquidity_usd must be non-negative, got {}",
                self.min_liquidity_usd
            )));
        }
        if !self.max_sell_tax_percent.is_finite()
            || self.max_sell_tax_percent < 0.0
            || self.max_sell_tax_percent > 100.0
        {
            return Err(self.invalid(format!(
                "max_sell_tax_percent out of range: {}",
                self.max_sell_tax_percent
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(self.invalid("timeout_seconds must be greater than zero"));
        }
        Ok(())
    }

    /// Parses and validates a TOML profile document.
    pub fn from_toml_str(doc: &str) -> Result<Self, ScreenerError> {
        let profile: RiskProfile =
            toml::from_str(doc).map_err(|e| ScreenerError::InvalidProfile {
                name: "<unparsed>".to_string(),
                reason: e.to_string(),
            })?;
        profile.validate()?;
        Ok(profile)
    }

    fn invalid(&self, reason: impl Into<String>) -> ScreenerError {
        ScreenerError::InvalidProfile {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self::moderate()
    }
}

/// Name-keyed profile store. Lookup is case-insensitive.
pub struct ProfileRegistry {
    profiles: RwLock<HashMap<String, Arc<RiskProfile>>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Registry seeded with the conservative/moderate/aggressive presets.
    pub fn with_builtins() -> Self {
        let mut profiles = HashMap::new();
        for profile in [
            RiskProfile::conservative(),
            RiskProfile::moderate(),
            RiskProfile::aggressive(),
        ] {
            profiles.insert(profile.name.clone(), Arc::new(profile));
        }
        Self {
            profiles: RwLock::new(profiles),
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<RiskProfile>> {
        self.profiles.read().await.get(&name.to_lowercase()).cloned()
    }

    /// Validates and stores a profile, replacing any previous version
    /// under the same name.
    pub async fn upsert(&self, profile: RiskProfile) -> Result<(), ScreenerError> {
        profile.validate()?;
        let key = profile.name.to_lowercase();
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&key) {
            warn!(profile = %key, "Replacing existing risk profile");
        } else {
            info!(profile = %key, "Registered risk profile");
        }
        profiles.insert(key, Arc::new(profile));
        Ok(())
    }

    pub async fn remove(&self, name: &str) -> bool {
        self.profiles
            .write()
            .await
            .remove(&name.to_lowercase())
            .is_some()
    }

    /// Registered profile names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }

    /// Loads, validates, and registers a TOML profile file. Returns the
    /// registered profile name.
    pub async fn load_from_file(&self, path: &Path) -> Result<String, ScreenerError> {
        let doc = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScreenerError::InvalidProfile {
                name: path.display().to_string(),
                reason: format!("unreadable profile file: {}", e),
            })?;
        let profile = RiskProfile::from_toml_str(&doc)?;
        let name = profile.name.clone();
        self.upsert(profile).await?;
        info!(profile = %name, path = %path.display(), "Loaded risk profile from file");
        Ok(name)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
