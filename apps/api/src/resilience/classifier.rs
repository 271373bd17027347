//! Error Classifier — transient vs. permanent failures and user-facing messages.
//!
//! Both entry points are pure and total: they only inspect the error's kind,
//! status code and rendered message.

use std::fmt::Display;

/// Phrases that mark a failure as transient when found in the lowercased message.
const RETRYABLE_PHRASES: &[&str] = &[
    "timeout",
    "network",
    "connection",
    "rate limit",
    "server error",
    "service unavailable",
    "temporarily unavailable",
];

/// What the classifier needs to know about an error beyond its message.
pub trait Classify: Display {
    /// True when the failure happened below HTTP (DNS, connect, reset).
    fn is_network_failure(&self) -> bool {
        false
    }

    /// True when the request ran out of time waiting on the provider.
    fn is_timeout(&self) -> bool {
        false
    }

    /// HTTP status associated with the failure, if any.
    fn status_code(&self) -> Option<u16> {
        None
    }
}

pub fn is_retryable<E: Classify + ?Sized>(error: &E) -> bool {
    if error.is_network_failure() || error.is_timeout() {
        return true;
    }

    if let Some(status) = error.status_code() {
        if status == 429 || status == 408 || (500..599).contains(&status) {
            return true;
        }
    }

    contains_any(&error.to_string().to_lowercase(), RETRYABLE_PHRASES)
}

/// User-facing failure categories. Each maps to one stable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Network,
    RateLimited,
    TimedOut,
    Unauthorized,
    QuotaExceeded,
    ContentBlocked,
    ServerError,
    NotFound,
    Unknown,
}

impl FailureCategory {
    pub fn user_message(self) -> &'static str {
        match self {
            FailureCategory::Network => {
                "Network error. Please check your internet connection and try again."
            }
            FailureCategory::RateLimited => {
                "Too many requests. Please wait a moment and try again."
            }
            FailureCategory::TimedOut => "The request timed out. Please try again.",
            FailureCategory::Unauthorized => {
                "The AI service rejected our credentials. Please contact support."
            }
            FailureCategory::QuotaExceeded => {
                "The AI service quota has been exceeded. Please check billing for the API key."
            }
            FailureCategory::ContentBlocked => {
                "The AI service declined to process this content. Please revise your resume or job description."
            }
            FailureCategory::ServerError => {
                "The AI service is having problems right now. Please try again later."
            }
            FailureCategory::NotFound => {
                "The requested AI model is unavailable. Please try again later."
            }
            FailureCategory::Unknown => "Failed to optimize resume. Please try again.",
        }
    }
}

/// Provider phrases first, then the HTTP status, then the fallback.
pub fn categorize<E: Classify + ?Sized>(error: &E) -> FailureCategory {
    let message = error.to_string().to_lowercase();
    let has = |needles: &[&str]| contains_any(&message, needles);

    if has(&["quota", "billing"][..]) {
        return FailureCategory::QuotaExceeded;
    }
    if has(&["api key", "api_key_invalid", "permission denied"][..]) {
        return FailureCategory::Unauthorized;
    }
    if has(&["safety", "blocked"][..]) {
        return FailureCategory::ContentBlocked;
    }
    // Timeouts are reported as such even when the transport also flags them.
    if error.is_timeout() || has(&["timeout", "timed out"][..]) {
        return FailureCategory::TimedOut;
    }
    if error.is_network_failure() || has(&["failed to fetch", "network", "connection"][..]) {
        return FailureCategory::Network;
    }
    if has(&["rate limit", "too many requests"][..]) {
        return FailureCategory::RateLimited;
    }

    match error.status_code() {
        Some(429) => FailureCategory::RateLimited,
        Some(408) | Some(504) => FailureCategory::TimedOut,
        Some(401) | Some(403) => FailureCategory::Unauthorized,
        Some(402) => FailureCategory::QuotaExceeded,
        Some(404) => FailureCategory::NotFound,
        Some(status) if (500..600).contains(&status) => FailureCategory::ServerError,
        _ => FailureCategory::Unknown,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub fn to_user_message<E: Classify + ?Sized>(error: &E) -> &'static str {
    categorize(error).user_message()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestError {
        message: &'static str,
        status: Option<u16>,
        network: bool,
        timeout: bool,
    }

    impl TestError {
        fn message(message: &'static str) -> Self {
            Self {
                message,
                status: None,
                network: false,
                timeout: false,
            }
        }

        fn status(status: u16, message: &'static str) -> Self {
            Self {
                message,
                status: Some(status),
                network: false,
                timeout: false,
            }
        }
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message)
        }
    }

    impl Classify for TestError {
        fn is_network_failure(&self) -> bool {
            self.network
        }

        fn is_timeout(&self) -> bool {
            self.timeout
        }

        fn status_code(&self) -> Option<u16> {
            self.status
        }
    }

    #[test]
    fn test_vocabulary_is_retryable_case_insensitive() {
        for phrase in [
            "Request TIMEOUT while waiting",
            "Network unreachable",
            "Connection reset by peer",
            "Rate Limit exceeded",
            "Internal Server Error",
            "Service Unavailable",
            "The model is temporarily unavailable",
        ] {
            assert!(
                is_retryable(&TestError::message(phrase)),
                "'{phrase}' should be retryable"
            );
        }
    }

    #[test]
    fn test_retryable_status_codes() {
        for status in [429, 408, 500, 502, 503, 598] {
            assert!(
                is_retryable(&TestError::status(status, "boom")),
                "{status} should be retryable"
            );
        }
    }

    #[test]
    fn test_non_retryable_status_codes() {
        for status in [400, 401, 403, 404, 422, 599] {
            assert!(
                !is_retryable(&TestError::status(status, "boom")),
                "{status} should not be retryable"
            );
        }
    }

    #[test]
    fn test_404_without_vocabulary_is_not_retryable() {
        let err = TestError::status(404, "models/gemini-x is not found for API version v1beta");
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_network_kind_is_retryable_regardless_of_message() {
        let err = TestError {
            message: "dns error",
            status: None,
            network: true,
            timeout: false,
        };
        assert!(is_retryable(&err));
        assert_eq!(categorize(&err), FailureCategory::Network);
    }

    #[test]
    fn test_transport_timeout_is_timed_out_not_network() {
        let err = TestError {
            message: "error sending request: operation timed out",
            status: None,
            network: true,
            timeout: true,
        };
        assert!(is_retryable(&err));
        assert_eq!(categorize(&err), FailureCategory::TimedOut);
        assert_eq!(to_user_message(&err), "The request timed out. Please try again.");

        let flagged_only = TestError {
            message: "error sending request",
            status: None,
            network: false,
            timeout: true,
        };
        assert!(is_retryable(&flagged_only));
        assert_eq!(categorize(&flagged_only), FailureCategory::TimedOut);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let err = TestError::status(503, "Service Unavailable");
        let first = (is_retryable(&err), to_user_message(&err));
        for _ in 0..10 {
            assert_eq!((is_retryable(&err), to_user_message(&err)), first);
        }
    }

    #[test]
    fn test_quota_phrase_wins_over_status() {
        let err = TestError::status(429, "You exceeded your current quota");
        assert_eq!(categorize(&err), FailureCategory::QuotaExceeded);
        assert!(to_user_message(&err).contains("billing"));
    }

    #[test]
    fn test_status_mapping_fallbacks() {
        assert_eq!(
            categorize(&TestError::status(429, "slow down")),
            FailureCategory::RateLimited
        );
        assert_eq!(
            categorize(&TestError::status(401, "bad creds")),
            FailureCategory::Unauthorized
        );
        assert_eq!(
            categorize(&TestError::status(402, "pay up")),
            FailureCategory::QuotaExceeded
        );
        assert_eq!(
            categorize(&TestError::status(404, "missing")),
            FailureCategory::NotFound
        );
        assert_eq!(
            categorize(&TestError::status(502, "bad gateway")),
            FailureCategory::ServerError
        );
        assert_eq!(
            categorize(&TestError::message("something odd")),
            FailureCategory::Unknown
        );
    }

    #[test]
    fn test_safety_block_maps_to_content_blocked() {
        let err = TestError::message("No content generated (finish reason: SAFETY)");
        assert_eq!(categorize(&err), FailureCategory::ContentBlocked);
        assert!(!is_retryable(&err));
    }
}
