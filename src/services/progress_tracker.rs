use std::collections::VecDeque;

use chrono::Local;
use parking_lot::Mutex;

use crate::domain::progress::{ProgressDetail, ProgressState, ProgressStatus};

const MAX_DETAILS: usize = 50;
const SNAPSHOT_DETAILS: usize = 10;

struct Progress {
    status: ProgressStatus,
    current_step: String,
    companies_found: usize,
    details: VecDeque<ProgressDetail>,
}

impl Progress {
    fn new(status: ProgressStatus, current_step: &str) -> Self {
        Progress {
            status,
            current_step: current_step.to_string(),
            companies_found: 0,
            details: VecDeque::with_capacity(MAX_DETAILS),
        }
    }
}

/// Status of the running search, shared between the search and pollers.
///
/// One lock guards every field; it is held only while fields are copied.
pub struct ProgressTracker {
    inner: Mutex<Progress>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        ProgressTracker {
            inner: Mutex::new(Progress::new(ProgressStatus::Idle, "")),
        }
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole state at the start of a search.
    pub fn reset(&self) {
        *self.inner.lock() = Progress::new(ProgressStatus::Starting, "Initializing search...");
    }

    pub fn update(
        &self,
        status: ProgressStatus,
        step: &str,
        companies_found: usize,
        detail: Option<&str>,
    ) {
        let detail = detail.filter(|d| !d.is_empty()).map(|message| ProgressDetail {
            time: Local::now().format("%H:%M:%S").to_string(),
            message: message.to_string(),
        });

        let mut progress = self.inner.lock();
        progress.status = status;
        progress.current_step = step.to_string();
        progress.companies_found = companies_found;
        if let Some(detail) = detail {
            if progress.details.len() == MAX_DETAILS {
                progress.details.pop_front();
            }
            progress.details.push_back(detail);
        }
    }

    /// Independent copy holding only the most recent details.
    pub fn snapshot(&self) -> ProgressState {
        let progress = self.inner.lock();
        let skip = progress.details.len().saturating_sub(SNAPSHOT_DETAILS);
        ProgressState {
            status: progress.status,
            current_step: progress.current_step.clone(),
            companies_found: progress.companies_found,
            details: progress.details.iter().skip(skip).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use crate::domain::progress::ProgressStatus;

    use super::{ProgressTracker, MAX_DETAILS, SNAPSHOT_DETAILS};

    #[test]
    fn starts_idle() {
        let tracker = ProgressTracker::new();
        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.status, ProgressStatus::Idle);
        assert_eq!(snapshot.companies_found, 0);
        assert!(snapshot.details.is_empty());
    }

    #[test]
    fn reset_replaces_everything() {
        let tracker = ProgressTracker::new();
        tracker.update(ProgressStatus::Found, "Found: Acme", 7, Some("Found Acme"));

        tracker.reset();
        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.status, ProgressStatus::Starting);
        assert_eq!(snapshot.current_step, "Initializing search...");
        assert_eq!(snapshot.companies_found, 0);
        assert!(snapshot.details.is_empty());
    }

    #[test]
    fn update_without_detail_keeps_log() {
        let tracker = ProgressTracker::new();
        tracker.update(ProgressStatus::Searching, "one", 0, Some("first"));
        tracker.update(ProgressStatus::Processing, "two", 3, None);
        tracker.update(ProgressStatus::Processing, "three", 3, Some(""));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, ProgressStatus::Processing);
        assert_eq!(snapshot.current_step, "three");
        assert_eq!(snapshot.companies_found, 3);
        assert_eq!(snapshot.details.len(), 1);
        assert_eq!(snapshot.details[0].message, "first");
    }

    #[test]
    fn snapshot_returns_latest_details_only() {
        let tracker = ProgressTracker::new();
        for i in 0..(MAX_DETAILS + 5) {
            tracker.update(ProgressStatus::Found, "step", i, Some(&format!("detail {}", i)));
        }

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.details.len(), SNAPSHOT_DETAILS);
        assert_eq!(
            snapshot.details.last().map(|d| d.message.as_str()),
            Some("detail 54")
        );
        assert_eq!(snapshot.details[0].message, "detail 45");
        assert_eq!(tracker.inner.lock().details.len(), MAX_DETAILS);
        assert_eq!(tracker.inner.lock().details[0].message, "detail 5");
    }

    #[test]
    fn snapshot_is_independent_copy() {
        let tracker = ProgressTracker::new();
        tracker.update(ProgressStatus::Searching, "before", 1, Some("a"));
        let snapshot = tracker.snapshot();

        tracker.update(ProgressStatus::Completed, "after", 9, Some("b"));

        assert_eq!(snapshot.current_step, "before");
        assert_eq!(snapshot.companies_found, 1);
        assert_eq!(snapshot.details.len(), 1);
    }

    #[test]
    fn concurrent_snapshots_never_mix_updates() {
        let tracker = Arc::new(ProgressTracker::new());

        let writer = {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for i in 0..5_000 {
                    let status = if i % 2 == 0 {
                        ProgressStatus::Searching
                    } else {
                        ProgressStatus::Found
                    };
                    tracker.update(status, &format!("step {}", i), i, Some(&i.to_string()));
                }
            })
        };

        for _ in 0..5_000 {
            let snapshot = tracker.snapshot();
            if snapshot.status == ProgressStatus::Idle {
                continue;
            }
            let i = snapshot.companies_found;
            assert_eq!(snapshot.current_step, format!("step {}", i));
            let expected = if i % 2 == 0 {
                ProgressStatus::Searching
            } else {
                ProgressStatus::Found
            };
            assert_eq!(snapshot.status, expected);
            assert_eq!(
                snapshot.details.last().map(|d| d.message.clone()),
                Some(i.to_string())
            );
        }

        writer.join().unwrap();
    }
}
