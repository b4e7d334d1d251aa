mod api_error;
pub mod default_route;
pub mod export_route;
pub mod history_route;
pub mod progress_route;
pub mod search_route;

pub use api_error::*;
