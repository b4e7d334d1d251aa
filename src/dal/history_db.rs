use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;

use crate::domain::history::{push_front_unique, HistoryEntry, SearchKind};

/// Storage for the recent-search list, newest entry first.
pub trait HistoryStore: Send + Sync {
    fn list(&self) -> anyhow::Result<Vec<HistoryEntry>>;
    fn append(&self, entry: HistoryEntry) -> anyhow::Result<()>;

    fn list_kind(&self, kind: Option<SearchKind>) -> anyhow::Result<Vec<HistoryEntry>> {
        let entries = self.list()?;
        Ok(match kind {
            Some(kind) => entries.into_iter().filter(|e| e.kind == kind).collect(),
            None => entries,
        })
    }
}

/// History kept as one JSON array on disk, rewritten on every append.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    max_items: usize,
    lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>, max_items: usize) -> Self {
        JsonFileHistoryStore {
            path: path.into(),
            max_items,
            lock: Mutex::new(()),
        }
    }

    fn read(path: &Path) -> anyhow::Result<Vec<HistoryEntry>> {
        if !path.exists() {
            return Ok(vec![]);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!(
                    "History file {} is not valid, starting over: {:?}",
                    path.display(),
                    e
                );
                Ok(vec![])
            }
        }
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn list(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock();
        Self::read(&self.path)
    }

    fn append(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let _guard = self.lock.lock();

        let history = push_front_unique(Self::read(&self.path)?, entry, self.max_items);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&history)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file {}", self.path.display()))?;

        log::info!("Saved search history ({} entries)", history.len());
        Ok(())
    }
}

pub struct InMemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
    max_items: usize,
}

impl InMemoryHistoryStore {
    pub fn new(max_items: usize) -> Self {
        InMemoryHistoryStore {
            entries: Mutex::new(vec![]),
            max_items,
        }
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn list(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn append(&self, entry: HistoryEntry) -> anyhow::Result<()> {
        let mut entries = self.entries.lock();
        let current = std::mem::take(&mut *entries);
        *entries = push_front_unique(current, entry, self.max_items);
        Ok(())
    }
}
