//! Access log ingestion: turns an uploaded byte buffer into a [`RecordSet`].
//!
//! Decoding is lossy and line parsing is silent: bytes that are not valid
//! UTF-8 are dropped, and lines that do not match the access log grammar
//! produce no record and no error.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

pub mod web_log;

use crate::LogRecord;

/// Ordered collection of records parsed from one upload.
///
/// The schema is all-or-nothing: an empty set has no columns, a non-empty
/// set has every [`LogRecord::COLUMNS`] entry. Detectors check their
/// required columns against it before scanning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<LogRecord>,
}

impl RecordSet {
    /// Decode `raw` and parse every line, keeping input order.
    pub fn parse(raw: &[u8]) -> Self {
        let text = decode_lossy(raw);
        let mut lines_read = 0usize;
        let records: Vec<LogRecord> = split_lines(&text)
            .inspect(|_| lines_read += 1)
            .filter_map(web_log::parse_line)
            .collect();

        log::debug!(
            "Parsed {} records from {} lines ({} bytes)",
            records.len(),
            lines_read,
            raw.len(),
        );
        Self { records }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns present in this set's schema.
    pub fn columns(&self) -> &'static [&'static str] {
        if self.records.is_empty() {
            &[]
        } else {
            LogRecord::COLUMNS
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a LogRecord;
    type IntoIter = std::slice::Iter<'a, LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parse an uploaded log file.
pub fn parse_log_file(raw: &[u8]) -> RecordSet {
    RecordSet::parse(raw)
}

/// Line terminators. `\r\n` counts as one break.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Split on every universal-newline terminator, not just `\n`. A final
/// terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(at) = rest.find(LINE_BREAKS) else {
            return Some(std::mem::take(&mut rest));
        };
        let (line, tail) = rest.split_at(at);
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
        Some(line)
    })
}

/// UTF-8 decode that skips invalid byte sequences instead of replacing them.
pub fn decode_lossy(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
