// Shared utility modules - no feature gating
pub mod constants;
mod errors;
mod timeout;

pub use errors::{SyndicationError, SyndicationResult};
pub use timeout::{DEFAULT_FETCH_TIMEOUT_MS, MAX_FETCH_TIMEOUT_MS, validate_fetch_timeout};
