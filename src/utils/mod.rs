pub mod config;
pub mod progress;
