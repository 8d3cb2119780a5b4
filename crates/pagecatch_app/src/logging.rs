//! Logger setup: terminal plus `<log_dir>/latest_page_catch.log`.

use std::fs::{File, OpenOptions};
use std::path::Path;

use log::LevelFilter;
use pagecatch_logging::{level_for, LOG_FILE_NAME};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Initialize the global logger. Debug level when `debug` is set.
///
/// The log file is opened in append mode. If it cannot be opened, logging
/// continues on the terminal only.
pub fn initialize(log_dir: &Path, debug: bool) {
    let level = level_for(debug);
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(file_logger) = create_file_logger(log_dir, level, config) {
        loggers.push(file_logger);
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    log_dir: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    let log_path = log_dir.join(LOG_FILE_NAME);
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not open log file at {:?}: {}", log_path, err);
            None
        }
    }
}
