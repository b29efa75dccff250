pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod labels;
