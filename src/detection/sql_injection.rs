//! # SQL Injection Classifier
//!
//! Two-tier path classifier. Paths under a known-benign prefix (static
//! assets, blog, versioned API) are only checked against a short list of
//! blatant injection signatures; every other path is checked against the
//! full primary set.
//!
//! ## Decision
//!
//! ```text
//! decoded = percent_decode(path)   (bad UTF-8 becomes U+FFFD)
//! if whitelist matches raw path:  suspicious = OBVIOUS matches decoded
//! else:                           suspicious = PRIMARY matches decoded
//! ```
//!
//! `matched_patterns` always rescans the decoded path against the full
//! primary set, whatever the whitelist said. It annotates flagged records
//! for analysts and plays no part in the decision, so a whitelisted path can
//! list primary patterns that were never consulted.
//!
//! Patterns are compiled once into `RegexSet`s. The regex engine matches in
//! linear time, so hostile paths cannot blow up classification cost.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use percent_encoding::percent_decode_str;
use regex::{RegexSet, RegexSetBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::log_sources::RecordSet;
use crate::Finding;

/// Primary signature set as `(identifier, pattern)`. Matched case-insensitively.
pub const PRIMARY_PATTERNS: &[(&str, &str)] = &[
    // Union-based
    ("union_select", r"union\s+(all\s+)?select"),
    ("select_from", r"select\s+.*\s+from"),
    ("select_star", r"select\s+\*"),
    // Boolean-based blind
    ("boolean_numeric", r"(and|or)\s+\d+\s*[=<>!]+\s*\d+"),
    ("boolean_string", r#"(and|or)\s+['"]*[a-z]+['"]*\s*[=<>!]+\s*['"]*[a-z]+['"]*"#),
    ("boolean_chain", r"(and|or)\s+\d+\s*(and|or)\s+\d+"),
    // Time-based blind
    ("time_delay", r"(sleep|waitfor|delay)\s*\(\s*\d+\s*\)"),
    ("benchmark", r"benchmark\s*\(\s*\d+"),
    ("pg_sleep", r"pg_sleep\s*\(\s*\d+\s*\)"),
    // Error-based
    ("type_conversion", r"(convert|cast|char)\s*\("),
    ("concat", r"concat\s*\("),
    ("group_concat", r"group_concat\s*\("),
    ("having_tautology", r"having\s+\d+\s*[=<>!]+\s*\d+"),
    // Authentication bypass
    ("auth_bypass_field", r#"(admin|user|login)['"]*\s*(=|like)\s*['"]*\s*(or|and)"#),
    ("auth_bypass_quote", r#"['"]\s*(or|and)\s*['"]*[^'"]*['"]*\s*(=|like)"#),
    ("auth_bypass_tautology", r#"['"]\s*(or|and)\s*\d+\s*[=<>!]+\s*\d+"#),
    // Statements and functions
    ("destructive_statement", r"(drop|delete|truncate|insert|update)\s+(table|from|into)"),
    ("stored_procedure", r"(exec|execute|sp_|xp_)\w*"),
    ("system_catalog", r"(information_schema|sys\.|mysql\.|pg_)"),
    ("file_access", r"(load_file|into\s+outfile|dumpfile)"),
    // Comments
    ("comment_token", r"(--|#|\*/|\*\*)"),
    ("block_comment", r"/\*.*\*/"),
    // Encodings
    ("encoded_special_char", r"(%27|%22|%2d%2d|%23)"),
    ("hex_literal", r"(0x[0-9a-f]+)"),
    ("char_code", r"(char\s*\(\s*\d+)"),
    // Neighbouring injection classes
    ("ldap_injection", r"(\*\)|(&\()|(\|\())"),
    ("script_injection", r"(<script|<iframe|javascript:|vbscript:)"),
    ("command_chain", r"(;|\|&|&&|\|\|).*(cat|ls|dir|type|echo|ping|nslookup|whoami)"),
    ("chained_traversal", r"(\.\./){2,}"),
    ("nosql_operator", r"(\$ne|\$gt|\$lt|\$regex|\$where)"),
];

/// High-confidence signatures applied to whitelisted paths.
pub const OBVIOUS_PATTERNS: &[&str] = &[
    r"union\s+select",
    r"(and|or)\s+\d+\s*=\s*\d+",
    r#"['"]\s*or\s*['"]*\d"#,
    r"drop\s+table",
    r"script\s*:",
    r"javascript\s*:",
];

/// Path prefixes presumed benign. Tested against the raw, undecoded path.
pub const WHITELIST_PATTERNS: &[&str] = &[
    r"^/[a-z]+mp3/",
    r"^/blog/",
    r"^/images/",
    r"^/css/",
    r"^/js/",
    r"^/api/v\d+/",
];

static CLASSIFIER: LazyLock<SqlInjectionClassifier> = LazyLock::new(SqlInjectionClassifier::new);

/// Compiled pattern sets. Read-only after construction.
pub struct SqlInjectionClassifier {
    primary: RegexSet,
    obvious: RegexSet,
    whitelist: RegexSet,
}

impl SqlInjectionClassifier {
    pub fn new() -> Self {
        Self {
            primary: compile(PRIMARY_PATTERNS.iter().map(|(_, pattern)| *pattern)),
            obvious: compile(OBVIOUS_PATTERNS.iter().copied()),
            whitelist: compile(WHITELIST_PATTERNS.iter().copied()),
        }
    }

    /// Process-wide instance.
    pub fn shared() -> &'static Self {
        &CLASSIFIER
    }

    pub fn is_whitelisted(&self, raw_path: &str) -> bool {
        self.whitelist.is_match(raw_path)
    }

    pub fn is_suspicious(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let decoded = decode_path(path);
        if self.is_whitelisted(path) {
            self.obvious.is_match(&decoded)
        } else {
            self.primary.is_match(&decoded)
        }
    }

    /// Identifiers of every primary pattern matching the decoded path.
    pub fn matched_patterns(&self, path: &str) -> Vec<&'static str> {
        if path.is_empty() {
            return Vec::new();
        }
        let decoded = decode_path(path);
        self.primary
            .matches(&decoded)
            .into_iter()
            .map(|i| PRIMARY_PATTERNS[i].0)
            .collect()
    }
}

impl Default for SqlInjectionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn compile<'a>(patterns: impl IntoIterator<Item = &'a str>) -> RegexSet {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .expect("sql injection patterns")
}

/// Percent-decode a request path. Escapes that decode to invalid UTF-8
/// become U+FFFD; every other escape is still decoded.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// Keep records with a suspicious path, annotated with `matched_patterns`.
pub fn detect(records: &RecordSet) -> Vec<Finding> {
    let classifier = SqlInjectionClassifier::shared();
    records
        .iter()
        .filter(|r| classifier.is_suspicious(&r.path))
        .map(|r| {
            let matched = classifier
                .matched_patterns(&r.path)
                .into_iter()
                .map(String::from)
                .collect();
            Finding::sql_injection(r, matched)
        })
        .collect()
}
