// Check contract and dispatch
pub mod registry;
pub mod traits;

pub use registry::CheckRegistry;
pub use traits::{RiskCheck, DEFAULT_CHECK_TIMEOUT};
