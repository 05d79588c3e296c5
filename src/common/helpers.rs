// Helper functions for safe logging and timestamps

use chrono::{DateTime, SecondsFormat, Utc};

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    let parts: Vec<&str> = email.split('@').collect();
    match parts.as_slice() {
        [local, domain] if email.len() > 3 && !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***@***.***".to_string(),
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...XVCJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Masks an optional email, used for profile fields that may be absent
pub fn safe_optional_email_log(email: Option<&str>) -> String {
    email.map(safe_email_log).unwrap_or_else(|| "<none>".to_string())
}

/// RFC 3339 UTC timestamp with millisecond precision and a `Z` suffix.
///
/// Fixed width, so stored values sort lexicographically in time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time formatted with [`format_timestamp`]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
