pub mod company;
pub mod history;
pub mod progress;
pub mod relevance;
pub mod search;
