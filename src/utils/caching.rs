use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::assessment::Assessment;

/// Cache configuration for screening results.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::assessments()
    }
}

impl CacheConfig {
    /// Configuration for assessment results (5 minute TTL).
    pub fn assessments() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }

    /// Cache that never serves anything; used to force fresh runs.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: Duration::from_secs(0),
            max_capacity: 0,
        }
    }
}

/// Per-asset memoization of finished assessments.
///
/// Entries expire on the cache TTL; on top of that every read re-checks
/// the assessment's own `expires_at`, so a stale entry is never served
/// even when the two clocks disagree. Capacity pressure evicts through
/// moka; with one uniform TTL the oldest entries lapse first.
pub struct AssessmentCache {
    entries: Cache<String, Arc<Assessment>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AssessmentCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl.max(Duration::from_millis(1)))
            .build();

        info!(
            enabled = config.enabled,
            ttl_seconds = config.ttl.as_secs(),
            max_capacity = config.max_capacity,
            "Assessment cache initialized"
        );

        Self {
            entries,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache key for one token/pair/profile combination.
    pub fn key(token_address: &str, pair_address: &str, profile_name: &str) -> String {
        format!(
            "{}:{}:{}",
            token_address.to_lowercase(),
            pair_address.to_lowercase(),
            profile_name.to_lowercase()
        )
    }

    /// Returns a fresh assessment if one is cached. Entries whose own
    /// expiry has lapsed are dropped and counted as misses.
    pub async fn get(&self, key: &str) -> Option<Arc<Assessment>> {
        if !self.config.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        match self.entries.get(key).await {
            Some(assessment) if assessment.is_fresh() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Assessment cache hit");
                Some(assessment)
            }
            Some(_) => {
                self.entries.invalidate(key).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Assessment cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores an assessment, atomically replacing any previous entry for
    /// the same asset and profile.
    pub async fn insert(&self, assessment: Arc<Assessment>) {
        if !self.config.enabled {
            return;
        }
        let key = Self::key(
            &assessment.token_address,
            &assessment.pair_address,
            &assessment.profile_name,
        );
        self.entries.insert(key, assessment).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        info!("Assessment cache cleared");
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Flushes pending maintenance so entry counts are exact.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: self.entries.entry_count(),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            ttl_seconds: self.config.ttl.as_secs(),
            max_capacity: self.config.max_capacity,
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}
