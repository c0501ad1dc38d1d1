//! Which failures are worth retrying.

use core::fmt;

/// HTTP "too many requests".
pub const TOO_MANY_REQUESTS: u16 = 429;

const RATE_LIMIT_PHRASES: &[&str] = &["rate limit", "rate-limit", "ratelimit", "too many"];

/// A failure coming back from a remote collaborator.
///
/// The classifier only needs an optional status code and the failure text.
pub trait RemoteFailure: fmt::Display {
    fn status(&self) -> Option<u16> {
        None
    }
}

impl RemoteFailure for String {}

impl RemoteFailure for &str {}

/// `true` if `err` signals rate limiting: status 429, or a message mentioning
/// a rate limit (case-insensitive).
pub fn is_rate_limited<E: RemoteFailure + ?Sized>(err: &E) -> bool {
    if err.status() == Some(TOO_MANY_REQUESTS) {
        return true;
    }
    let message = err.to_string().to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|phrase| message.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Coded(u16, &'static str);

    impl fmt::Display for Coded {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.1)
        }
    }

    impl RemoteFailure for Coded {
        fn status(&self) -> Option<u16> {
            Some(self.0)
        }
    }

    #[test]
    fn status_429_is_rate_limited() {
        assert!(is_rate_limited(&Coded(429, "slow down")));
    }

    #[test]
    fn message_phrases_are_matched_case_insensitively() {
        assert!(is_rate_limited(&"Rate limit exceeded".to_string()));
        assert!(is_rate_limited(&"TOO MANY requests"));
        assert!(is_rate_limited(&Coded(500, "upstream rate-limit hit")));
    }

    #[test]
    fn other_failures_are_not_retryable() {
        assert!(!is_rate_limited(&Coded(400, "bad request")));
        assert!(!is_rate_limited(&"connection reset"));
    }
}
