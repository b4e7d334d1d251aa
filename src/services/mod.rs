pub mod contact_scraper;
pub mod orchestrator;
pub mod progress_tracker;
pub mod providers;
pub mod spreadsheet;

pub use contact_scraper::*;
pub use orchestrator::*;
pub use progress_tracker::*;
pub use spreadsheet::*;
