pub mod profiles;
pub mod settings;

pub use profiles::{ProfileRegistry, RiskProfile, DEFAULT_BLOCKING_THRESHOLD, PROFILE_SCHEMA_VERSION};
pub use settings::{BatchSettings, CacheSettings, EngineSettings, LoggingSettings};
