//! # Bot Detector
//!
//! Classifies user agents into crawler, client library and suspicious
//! buckets. Classification is first-match-wins in that order, so an agent
//! carrying both a crawler name and a library token counts as a crawler.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

use crate::log_sources::RecordSet;
use crate::{BotType, Finding};

const CRAWLERS: &[&str] = &[
    "googlebot", "bingbot", "baiduspider", "yandexbot",
    "duckduckbot", "slurp", "facebookexternalhit", "twitterbot",
    "applebot", "linkedinbot", "petalbot", "semrushbot",
];

const CLIENT_LIBS: &[&str] = &[
    "curl", "wget", "httpclient", "python-requests", "aiohttp",
    "okhttp", "java/", "libwww-perl", "go-http-client", "restsharp",
    "scrapy", "httpie",
];

/// Agents shorter than this many characters are treated as suspicious.
const MIN_BROWSER_UA_LEN: usize = 10;

/// Classify a user agent. None means it looks like an ordinary browser.
pub fn classify_user_agent(user_agent: &str) -> Option<BotType> {
    let ua = user_agent.to_lowercase();

    if CRAWLERS.iter().any(|c| ua.contains(c)) {
        return Some(BotType::CrawlerBot);
    }
    if CLIENT_LIBS.iter().any(|lib| ua.contains(lib)) {
        return Some(BotType::ClientLibraryBot);
    }
    if ua.trim().is_empty() || ua.chars().count() < MIN_BROWSER_UA_LEN || !ua.contains("mozilla") {
        return Some(BotType::SuspiciousUserAgent);
    }
    None
}

/// Keep records whose agent classifies, tagged with their `bot_type`.
pub fn detect(records: &RecordSet) -> Vec<Finding> {
    records
        .iter()
        .filter_map(|r| classify_user_agent(&r.user_agent).map(|bot| Finding::bot(r, bot)))
        .collect()
}
