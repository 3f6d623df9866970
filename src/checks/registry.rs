// Check Registry - enum-keyed dispatch table resolved once at startup
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::checks::traits::RiskCheck;
use crate::models::check::CheckCategory;

/// Static map from check category to implementation.
///
/// The registry is populated during engine construction and immutable
/// afterwards; the engine holds it behind an `Arc` and resolves every
/// dispatch with a plain map lookup.
pub struct CheckRegistry {
    checks: HashMap<CheckCategory, Arc<dyn RiskCheck>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Registers a check for its category, replacing any previous one.
    pub fn register(&mut self, check: Arc<dyn RiskCheck>) {
        let category = check.category();
        if self.checks.contains_key(&category) {
            warn!(category = %category, "Replacing registered check");
        } else {
            info!(
                category = %category,
                version = check.version(),
                "Registered risk check"
            );
        }
        self.checks.insert(category, check);
    }

    pub fn get(&self, category: CheckCategory) -> Option<Arc<dyn RiskCheck>> {
        self.checks.get(&category).cloned()
    }

    pub fn contains(&self, category: CheckCategory) -> bool {
        self.checks.contains_key(&category)
    }

    /// Registered categories, sorted by name for stable output.
    pub fn categories(&self) -> Vec<CheckCategory> {
        let mut categories: Vec<CheckCategory> = self.checks.keys().copied().collect();
        categories.sort_by_key(|c| c.as_str());
        categories
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}
