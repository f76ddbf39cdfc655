//! Log Redaction Layer
//!
//! Scrubs email addresses, access tokens, and phone numbers from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap());
static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Emails first so their digits are not taken for phone numbers
    let redacted = EMAIL_RE.replace_all(input, "[REDACTED_EMAIL]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn test_email_redaction() {
        let clean = redact_sensitive_data("mail me at jane.doe99@example.com please");
        assert_eq!(clean, "mail me at [REDACTED_EMAIL] please");
    }

    #[test]
    fn test_plain_text_untouched() {
        let raw = "What are your skills?";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
