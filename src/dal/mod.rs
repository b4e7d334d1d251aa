pub mod history_db;

pub use history_db::*;
