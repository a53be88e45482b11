//! Timeout validation for outbound HTTP requests

use std::time::Duration;

use super::errors::{SyndicationError, SyndicationResult};

/// Maximum timeout for a single outbound request (5 minutes)
/// Covers slow personal sites and a congested geocoder
pub const MAX_FETCH_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// Default timeout when the config does not name one
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Validate timeout for outbound requests
///
/// # Arguments
/// * `timeout_ms` - Optional timeout in milliseconds
/// * `default_ms` - Default timeout if None provided
///
/// # Returns
/// * `Ok(Duration)` - Validated Duration object
/// * `Err(SyndicationError::Config)` - If timeout is zero or exceeds MAX_FETCH_TIMEOUT_MS
pub fn validate_fetch_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> SyndicationResult<Duration> {
    let ms = timeout_ms.unwrap_or(default_ms);

    if ms == 0 {
        return Err(SyndicationError::Config(
            "Timeout must be greater than 0ms".to_string(),
        ));
    }

    if ms > MAX_FETCH_TIMEOUT_MS {
        return Err(SyndicationError::Config(format!(
            "Timeout cannot exceed {}ms ({} minutes). Received: {}ms ({:.1} minutes)",
            MAX_FETCH_TIMEOUT_MS,
            MAX_FETCH_TIMEOUT_MS / 60_000,
            ms,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default() {
        let timeout = validate_fetch_timeout(None, 1_500).unwrap();
        assert_eq!(timeout, Duration::from_millis(1_500));
    }

    #[test]
    fn rejects_zero_and_oversized_values() {
        assert!(validate_fetch_timeout(Some(0), 1_000).is_err());
        assert!(validate_fetch_timeout(Some(MAX_FETCH_TIMEOUT_MS + 1), 1_000).is_err());
        assert!(validate_fetch_timeout(Some(MAX_FETCH_TIMEOUT_MS), 1_000).is_ok());
    }
}
