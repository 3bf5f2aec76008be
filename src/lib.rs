//! # logscan - Core Library
//!
//! Access log threat scanner. Parses web server access logs into structured
//! records and runs them through a fixed battery of rule-based detectors:
//! SQL injection, path traversal, bots, LFI/RFI, CMS probing, brute force,
//! error bursts and internal-IP leakage.
//!
//! ## Pipeline
//! raw bytes -> [`log_sources::RecordSet`] -> one [`detection::Detector`]
//! -> [`detection::DetectionResult`] -> caller ([`api::ScanPage`], CLI, HTTP).
//!
//! Each upload is classified independently. Nothing is persisted and the
//! pattern sets never change at runtime.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

pub mod api;
pub mod detection;
pub mod log_sources;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for logscan.
///
/// The parsing and detection core never produces these; they only come from
/// the I/O boundary (config, files, uploads, detector lookup).
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown detector: '{0}'")]
    UnknownDetector(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Upload exceeds the {0} byte limit")]
    UploadTooLarge(usize),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Scan worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type ScanResult<T> = Result<T, ScanError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Top-level configuration for logscan.
///
/// Loaded from `logscan.toml` in the working directory or a path supplied
/// via CLI flag. Every section falls back to its defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScannerConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Result paging settings shared by the CLI and the HTTP API.
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0").
    pub bind_address: String,

    /// Port to listen on.
    pub port: u16,

    /// Whether to attach a CORS layer to the API.
    pub enable_cors: bool,

    /// Allowed origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,

    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Page size used when a caller does not pass `limit`.
    pub default_limit: usize,

    /// Optional upper bound on `limit`. None = unbounded.
    pub max_limit: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6969,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_limit: 500,
            max_limit: None,
        }
    }
}

impl ScannerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScannerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &std::path::Path) -> ScanResult<Self> {
        if path.exists() {
            log::info!("Loading configuration from: {}", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the default configuration to a TOML file.
    pub fn write_default(path: &std::path::Path) -> ScanResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| ScanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would make the scanner unusable.
    pub fn validate(&self) -> ScanResult<()> {
        if self.server.port == 0 {
            return Err(ScanError::Config("server.port must be non-zero".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ScanError::Config(
                "server.max_upload_bytes must be non-zero".into(),
            ));
        }
        if self.scan.default_limit == 0 {
            return Err(ScanError::Config("scan.default_limit must be at least 1".into()));
        }
        if let Some(max) = self.scan.max_limit {
            if max < self.scan.default_limit {
                return Err(ScanError::Config(format!(
                    "scan.max_limit ({}) is below scan.default_limit ({})",
                    max, self.scan.default_limit
                )));
            }
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

// ---------------------------------------------------------------------------
// Core Types
// ---------------------------------------------------------------------------

/// One structured access log line.
///
/// Produced only when the full line grammar matched; there are no partial
/// records. Detectors read records and never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Source address as written in the log. Not validated.
    pub ip: String,

    /// Request time with its original UTC offset. None if the bracketed
    /// text did not match `%d/%b/%Y:%H:%M:%S %z`.
    pub timestamp: Option<DateTime<FixedOffset>>,

    pub method: String,
    pub path: String,
    pub protocol: String,

    /// Three-digit status code, kept as text.
    pub status: String,

    /// Response size. `-` reads as 0; anything non-numeric is None.
    pub bytes: Option<u64>,

    pub referrer: String,
    pub user_agent: String,
    pub host: String,
    pub server_ip: String,
}

impl LogRecord {
    /// Column names of a parsed record, in log order.
    pub const COLUMNS: &'static [&'static str] = &[
        "ip",
        "timestamp",
        "method",
        "path",
        "protocol",
        "status",
        "bytes",
        "referrer",
        "user_agent",
        "host",
        "server_ip",
    ];
}

/// User agent category assigned by the bot detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotType {
    /// Known search engine or social media crawler.
    #[serde(rename = "Crawler Bot")]
    CrawlerBot,

    /// HTTP client library or command line tool.
    #[serde(rename = "Client Library Bot")]
    ClientLibraryBot,

    /// Empty, very short, or non-browser user agent.
    #[serde(rename = "Suspicious User-Agent")]
    SuspiciousUserAgent,
}

impl BotType {
    pub fn label(&self) -> &'static str {
        match self {
            BotType::CrawlerBot => "Crawler Bot",
            BotType::ClientLibraryBot => "Client Library Bot",
            BotType::SuspiciousUserAgent => "Suspicious User-Agent",
        }
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A flagged record, restricted to the producing detector's projection.
///
/// `method` is absent for bot findings, `bot_type` is only set by the bot
/// detector and `matched_patterns` only by the SQL injection detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub ip: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub path: String,
    pub status: String,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_type: Option<BotType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_patterns: Option<Vec<String>>,
}

impl Finding {
    /// Standard projection: `ip, timestamp, method, path, status, user_agent`.
    pub fn from_record(record: &LogRecord) -> Self {
        Self {
            ip: record.ip.clone(),
            timestamp: record.timestamp,
            method: Some(record.method.clone()),
            path: record.path.clone(),
            status: record.status.clone(),
            user_agent: record.user_agent.clone(),
            bot_type: None,
            matched_patterns: None,
        }
    }

    /// Bot projection: drops `method`, adds `bot_type`.
    pub fn bot(record: &LogRecord, bot_type: BotType) -> Self {
        Self {
            method: None,
            bot_type: Some(bot_type),
            ..Self::from_record(record)
        }
    }

    /// SQL injection projection: standard columns plus `matched_patterns`.
    pub fn sql_injection(record: &LogRecord, matched_patterns: Vec<String>) -> Self {
        Self {
            matched_patterns: Some(matched_patterns),
            ..Self::from_record(record)
        }
    }

    /// Value of a projected column as JSON. Unknown or unset columns are null.
    pub fn field(&self, column: &str) -> serde_json::Value {
        use serde_json::Value;
        match column {
            "ip" => Value::from(self.ip.as_str()),
            "timestamp" => self
                .timestamp
                .map(|ts| Value::from(ts.to_rfc3339()))
                .unwrap_or(Value::Null),
            "method" => self
                .method
                .as_deref()
                .map(Value::from)
                .unwrap_or(Value::Null),
            "path" => Value::from(self.path.as_str()),
            "status" => Value::from(self.status.as_str()),
            "user_agent" => Value::from(self.user_agent.as_str()),
            "bot_type" => self
                .bot_type
                .map(|b| Value::from(b.label()))
                .unwrap_or(Value::Null),
            "matched_patterns" => self
                .matched_patterns
                .as_ref()
                .map(|p| Value::from(p.clone()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}
