use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Industry,
    Product,
}

impl SearchKind {
    /// Anything that is not "product" is an industry search.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("product") => SearchKind::Product,
            _ => SearchKind::Industry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub query: String,
    #[serde(default)]
    pub industry_filter: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(kind: SearchKind, query: &str, industry_filter: &str) -> Self {
        let timestamp = Utc::now();
        HistoryEntry {
            id: timestamp.timestamp_millis(),
            kind,
            query: query.trim().to_string(),
            industry_filter: industry_filter.trim().to_string(),
            timestamp,
        }
    }

    fn same_search(&self, other: &HistoryEntry) -> bool {
        self.kind == other.kind && self.query.to_lowercase() == other.query.to_lowercase()
    }
}

/// Puts `entry` first, dropping an older entry for the same search and
/// anything beyond `max_items`.
pub fn push_front_unique(
    history: Vec<HistoryEntry>,
    entry: HistoryEntry,
    max_items: usize,
) -> Vec<HistoryEntry> {
    let rest: Vec<HistoryEntry> = history
        .into_iter()
        .filter(|item| !item.same_search(&entry))
        .collect();
    let mut merged = Vec::with_capacity(rest.len() + 1);
    merged.push(entry);
    merged.extend(rest);
    merged.truncate(max_items);
    merged
}
