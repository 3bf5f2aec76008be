//! Request path rules: directory traversal, file inclusion and WordPress /
//! PHP probing. All matching is case-insensitive and runs on the raw path
//! as logged.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use regex::Regex;
use std::sync::LazyLock;

static RE_TRAVERSAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.\./|%2e%2e%2f|%2e%2f|%2f\.\.|/\.{2})").expect("regex")
});

static RE_LFI_RFI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(etc/passwd|proc/self/environ|input_file=|data:text)").expect("regex")
});

static RE_WP_PROBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.php|/wp-|xmlrpc\.php|\?author=|\?p=)").expect("regex")
});

/// Paths nested deeper than this many `/` separators count as traversal.
pub const MAX_PATH_DEPTH: usize = 15;

/// Traversal sequence (plain or percent-encoded) or an abnormally deep path.
pub fn is_path_traversal(path: &str) -> bool {
    RE_TRAVERSAL.is_match(path) || path.matches('/').count() > MAX_PATH_DEPTH
}

pub fn is_lfi_rfi(path: &str) -> bool {
    RE_LFI_RFI.is_match(path)
}

pub fn is_wp_probe(path: &str) -> bool {
    RE_WP_PROBE.is_match(path)
}
