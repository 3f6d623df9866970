pub mod retry;
pub mod types;

pub use retry::{retry_check, with_timeout, RetryConfig};
pub use types::ScreenerError;
