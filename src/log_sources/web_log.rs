//! Parser for the extended combined access log format.
//!
//! Format: `IP - - [DD/Mon/YYYY:HH:MM:SS +ZZZZ] "METHOD /path PROTOCOL" status size "referer" "user-agent" host server_ip`
//!
//! This is the Apache/Nginx combined format with the virtual host and the
//! server address appended.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::sync::LazyLock;

use crate::LogRecord;

static RE_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(?P<ip>\S+) - - \[(?P<timestamp>.*?)\] "#,
        r#""(?P<method>\S+) (?P<path>\S+) (?P<protocol>[^"]+)" "#,
        r#"(?P<status>\d{3}) (?P<bytes>\S+) "#,
        r#""(?P<referrer>[^"]*)" "(?P<user_agent>[^"]*)" "#,
        r#"(?P<host>\S+) (?P<server_ip>\S+)"#,
    ))
    .expect("regex")
});

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Parse a single access log line into a record.
///
/// Returns None when the line does not begin with the full grammar. Text
/// after `server_ip` is ignored.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = RE_ACCESS.captures(line)?;
    let field = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

    Some(LogRecord {
        ip: field("ip").into(),
        timestamp: parse_timestamp(field("timestamp")),
        method: field("method").into(),
        path: field("path").into(),
        protocol: field("protocol").into(),
        status: field("status").into(),
        bytes: parse_bytes(field("bytes")),
        referrer: field("referrer").into(),
        user_agent: field("user_agent").into(),
        host: field("host").into(),
        server_ip: field("server_ip").into(),
    })
}

/// Parse `10/Oct/2023:13:55:36 +0000`, keeping the written offset.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()
}

/// `-` means no body and reads as 0. Anything else non-numeric is unset.
pub fn parse_bytes(raw: &str) -> Option<u64> {
    if raw == "-" {
        return Some(0);
    }
    raw.parse().ok()
}
