//! Logging initialization for archiver_app.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Initialize terminal logging plus a `./archiver.log` file.
///
/// The file logger is skipped with a warning when the log file cannot be
/// created; the terminal logger always runs.
pub fn initialize() {
    let level = LevelFilter::Info;
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_path = Path::new("./archiver.log");
    match File::create(log_path) {
        Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
        Err(err) => eprintln!("Warning: could not create {}: {err}", log_path.display()),
    }

    let _ = CombinedLogger::init(loggers);
}
