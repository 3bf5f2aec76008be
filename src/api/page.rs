//! Result paging shared by the CLI and the HTTP API.
//!
//! A page reports the total finding count, whether more findings follow, and
//! the requested slice laid out column-wise: one JSON array per projected
//! column, in projection order.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::detection::DetectionResult;
use crate::{ScanConfig, ScanError, ScanResult};

/// Column-oriented slice of findings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    columns: Vec<(&'static str, Vec<Value>)>,
}

impl Columns {
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// One page of a detector's output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanPage {
    /// Total findings before slicing.
    pub count: usize,

    /// True if findings remain past this page.
    pub is_more: bool,

    pub results: Columns,
}

impl ScanPage {
    /// Slice `[offset, offset + limit)` out of `result`.
    pub fn build(result: &DetectionResult, limit: usize, offset: usize) -> Self {
        let findings = result.findings();
        let count = findings.len();
        let end = offset.saturating_add(limit);
        let page = &findings[offset.min(count)..end.min(count)];

        let columns = result
            .columns()
            .iter()
            .map(|&name| (name, page.iter().map(|f| f.field(name)).collect()))
            .collect();

        Self {
            count,
            is_more: end < count,
            results: Columns { columns },
        }
    }
}

/// `limit` / `offset` as passed on the command line or query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    /// Apply defaults and bounds. Returns `(limit, offset)`.
    pub fn resolve(&self, config: &ScanConfig) -> ScanResult<(usize, usize)> {
        let limit = self.limit.unwrap_or(config.default_limit);
        if limit == 0 {
            return Err(ScanError::InvalidRequest("limit must be at least 1".into()));
        }
        if let Some(max) = config.max_limit {
            if limit > max {
                return Err(ScanError::InvalidRequest(format!(
                    "limit must be at most {}",
                    max
                )));
            }
        }
        Ok((limit, self.offset.unwrap_or(0)))
    }
}
