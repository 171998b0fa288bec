//! Request-level constants and helpers shared by all handlers.

use axum::http::HeaderMap;

/// Cookie carrying the opaque customer session token. The gateway never
/// inspects the value; it is minted and rotated by the billing service.
pub const CUSTOMER_TOKEN_COOKIE: &str = "_ps_ctkn";

pub const HEADER_ACCEPT_LANGUAGE: &str = "accept-language";
pub const HEADER_USER_AGENT: &str = "user-agent";
pub const HEADER_X_API_SIGNATURE: &str = "x-api-signature";
pub const HEADER_REFERER: &str = "referer";
pub const HEADER_X_REQUEST_ID: &str = "x-request-id";

pub const QUERY_UTM_SOURCE: &str = "utm_source";
pub const QUERY_UTM_MEDIUM: &str = "utm_medium";
pub const QUERY_UTM_CAMPAIGN: &str = "utm_campaign";

/// Read a header as a string, or empty if missing or non-UTF8.
pub fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Best-effort client IP: first entry of `X-Forwarded-For`, then
/// `X-Real-IP`, then empty. The gateway always runs behind a proxy that
/// sets one of these.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    header_value(headers, "x-real-ip")
}
