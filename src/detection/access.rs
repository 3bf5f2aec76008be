//! Status code and source address rules: brute force against login
//! endpoints, error responses, and internal source addresses.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use regex::Regex;
use std::sync::LazyLock;

static RE_LOGIN_ENDPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(login|admin|signin|wp-login\.php)").expect("regex")
});

/// Responses that mean an authentication attempt was refused or throttled.
pub const REJECTED_STATUSES: &[&str] = &["401", "403", "429"];

pub const ERROR_STATUSES: &[&str] = &["403", "404", "406", "500", "502"];

/// Source address prefixes treated as internal. `172.` covers the whole
/// first octet, not only 172.16.0.0/12.
pub const INTERNAL_IP_PREFIXES: &[&str] = &["192.168.", "10.", "127.", "172."];

/// Login or admin endpoint answered with a rejection status.
pub fn is_brute_force(path: &str, status: &str) -> bool {
    RE_LOGIN_ENDPOINT.is_match(path) && REJECTED_STATUSES.contains(&status)
}

pub fn is_error_status(status: &str) -> bool {
    ERROR_STATUSES.contains(&status)
}

pub fn is_internal_ip(ip: &str) -> bool {
    INTERNAL_IP_PREFIXES.iter().any(|prefix| ip.starts_with(prefix))
}
