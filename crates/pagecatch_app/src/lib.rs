//! Pagecatch application: configuration, run loop and report delivery.
pub mod app;
pub mod config;
pub mod config_store;
pub mod effects;
pub mod logging;
pub mod notify;
pub mod smtp;

pub use app::{run, RunResult};
pub use config::AppConfig;
