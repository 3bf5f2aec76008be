//! # Detection Engine
//!
//! Eight fixed detectors share one shape: read a [`RecordSet`], return the
//! flagged subset as a [`DetectionResult`] in original file order. They are
//! variants of a single [`Detector`] enum selected by slug, not trait
//! objects.
//!
//! Every detector first checks its required columns against the record
//! schema. A missing column (which only happens when nothing parsed) is an
//! empty result, never an error.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

pub mod access;
pub mod bot;
pub mod path;
pub mod sql_injection;

use std::fmt;
use std::str::FromStr;

use crate::log_sources::RecordSet;
use crate::{Finding, LogRecord, ScanError};

/// Projection emitted by the path, status and IP detectors.
pub const STANDARD_COLUMNS: &[&str] = &["ip", "timestamp", "method", "path", "status", "user_agent"];

/// Projection emitted by the bot detector.
pub const BOT_COLUMNS: &[&str] = &["ip", "timestamp", "path", "status", "user_agent", "bot_type"];

/// Projection emitted by the SQL injection detector.
pub const SQL_INJECTION_COLUMNS: &[&str] = &[
    "ip",
    "timestamp",
    "method",
    "path",
    "status",
    "user_agent",
    "matched_patterns",
];

/// The detector battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    SqlInjection,
    PathTraversal,
    Bot,
    LfiRfi,
    WpProbe,
    BruteForce,
    Error,
    InternalIp,
}

impl Detector {
    /// Dispatch table order. `scan_all` and the CLI listing follow it.
    pub const ALL: [Detector; 8] = [
        Detector::SqlInjection,
        Detector::PathTraversal,
        Detector::Bot,
        Detector::LfiRfi,
        Detector::WpProbe,
        Detector::BruteForce,
        Detector::Error,
        Detector::InternalIp,
    ];

    /// Route and CLI name.
    pub fn slug(&self) -> &'static str {
        match self {
            Detector::SqlInjection => "sql-injection",
            Detector::PathTraversal => "path-traversal",
            Detector::Bot => "bots",
            Detector::LfiRfi => "lfi-rfi",
            Detector::WpProbe => "wp-probe",
            Detector::BruteForce => "brute-force",
            Detector::Error => "errors",
            Detector::InternalIp => "internal-ip",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Detector::SqlInjection => "SQL, NoSQL, LDAP and script injection in the request path",
            Detector::PathTraversal => "Directory traversal sequences or abnormally deep paths",
            Detector::Bot => "Crawlers, HTTP client libraries and suspicious user agents",
            Detector::LfiRfi => "Local/remote file inclusion payloads",
            Detector::WpProbe => "WordPress and PHP endpoint probing",
            Detector::BruteForce => "Rejected requests against login and admin endpoints",
            Detector::Error => "Client and server error responses",
            Detector::InternalIp => "Requests from private or loopback source addresses",
        }
    }

    /// Record columns this detector reads.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Detector::SqlInjection
            | Detector::PathTraversal
            | Detector::LfiRfi
            | Detector::WpProbe => &["path"],
            Detector::BruteForce => &["path", "status"],
            Detector::Error => &["status"],
            Detector::InternalIp => &["ip"],
            Detector::Bot => &["user_agent"],
        }
    }

    /// Columns of each emitted finding.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Detector::SqlInjection => SQL_INJECTION_COLUMNS,
            Detector::Bot => BOT_COLUMNS,
            _ => STANDARD_COLUMNS,
        }
    }

    /// Run this detector over a parsed upload.
    pub fn detect(&self, records: &RecordSet) -> DetectionResult {
        if let Some(missing) = self
            .required_columns()
            .iter()
            .find(|column| !records.has_column(column))
        {
            log::debug!("{}: no '{}' column, nothing to scan", self.slug(), missing);
            return DetectionResult::empty(*self);
        }

        let findings = match self {
            Detector::SqlInjection => sql_injection::detect(records),
            Detector::Bot => bot::detect(records),
            Detector::PathTraversal => flag(records, |r| path::is_path_traversal(&r.path)),
            Detector::LfiRfi => flag(records, |r| path::is_lfi_rfi(&r.path)),
            Detector::WpProbe => flag(records, |r| path::is_wp_probe(&r.path)),
            Detector::BruteForce => flag(records, |r| access::is_brute_force(&r.path, &r.status)),
            Detector::Error => flag(records, |r| access::is_error_status(&r.status)),
            Detector::InternalIp => flag(records, |r| access::is_internal_ip(&r.ip)),
        };

        log::debug!(
            "{}: flagged {} of {} records",
            self.slug(),
            findings.len(),
            records.len(),
        );
        DetectionResult::new(*self, findings)
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Detector {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Detector::ALL
            .into_iter()
            .find(|d| d.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScanError::UnknownDetector(s.to_string()))
    }
}

/// Standard-projection filter shared by the simple detectors.
fn flag(records: &RecordSet, keep: impl Fn(&LogRecord) -> bool) -> Vec<Finding> {
    records
        .iter()
        .filter(|r| keep(r))
        .map(Finding::from_record)
        .collect()
}

/// Output of one detector over one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    detector: Detector,
    columns: &'static [&'static str],
    findings: Vec<Finding>,
}

impl DetectionResult {
    /// Short-circuit result: no findings and no columns.
    pub fn empty(detector: Detector) -> Self {
        Self {
            detector,
            columns: &[],
            findings: Vec::new(),
        }
    }

    pub fn new(detector: Detector, findings: Vec<Finding>) -> Self {
        // SQL injection only emits its columns, matched_patterns included,
        // when something was flagged.
        let columns: &'static [&'static str] = if detector == Detector::SqlInjection && findings.is_empty() {
            &[]
        } else {
            detector.columns()
        };
        Self {
            detector,
            columns,
            findings,
        }
    }

    pub fn detector(&self) -> Detector {
        self.detector
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Run every detector over the same records, in dispatch-table order.
pub fn scan_all(records: &RecordSet) -> Vec<DetectionResult> {
    Detector::ALL.iter().map(|d| d.detect(records)).collect()
}
