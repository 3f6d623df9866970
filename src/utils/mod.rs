pub mod caching;
pub mod validation;

pub use caching::{AssessmentCache, CacheConfig, CacheStats};
pub use validation::InputValidator;
