use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Idle,
    Starting,
    Searching,
    Processing,
    Found,
    Warning,
    Error,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressDetail {
    pub time: String,
    pub message: String,
}

/// What a poller sees of the current search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressState {
    pub status: ProgressStatus,
    pub current_step: String,
    pub companies_found: usize,
    pub details: Vec<ProgressDetail>,
}
