//! Rate-limit detection for Linear API errors.
//!
//! Linear signals rate limits through:
//! - GraphQL errors with the `RATELIMITED` extension code (HTTP 400)
//! - HTTP 429 from the edge
//! - complexity errors when a single query asks for too much

/// Check whether an error message indicates a Linear rate limit.
pub fn is_rate_limited(error: &anyhow::Error) -> bool {
    let msg = format!("{error:#}").to_lowercase();
    msg.contains("rate limit")
        || msg.contains("ratelimited")
        || msg.contains("status code: 429")
        || msg.contains("query complexity")
}

/// Format a user-friendly hint for a rate-limit error.
pub fn format_rate_limit_message(error: &anyhow::Error) -> String {
    let msg = format!("{error:#}");
    if msg.to_lowercase().contains("complexity") {
        "Query complexity limit hit; lower --limit and retry".to_owned()
    } else {
        "Linear API rate limit exceeded; wait a moment then retry".to_owned()
    }
}
