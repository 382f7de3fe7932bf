//! # mlogger
//!
//! Structured logging facade that writes every record to several
//! destinations at once.
//!
//! ## Modules
//!
//! - `record` - levels, attribute values and the immutable `Record`
//! - `handler` - the `Handler` trait, the fan-out `MultiHandler`, and the
//!   text (console) and JSON (file) handlers
//! - `rotate` - size-rotated log file with retention and compression
//! - `logger` - `Logger` facade and the process-wide default logger
//! - `layer` - bridge from `tracing` events to a handler
//! - `config` - `LoggerConfig` and environment loading
//! - `error` - error types

pub mod config;
pub mod error;
pub mod handler;
pub mod layer;
pub mod logger;
pub mod record;
pub mod rotate;

pub use config::{FileConfig, LoggerConfig};
pub use error::{ConfigError, HandlerError};
pub use handler::{Handler, HandlerOptions, JsonHandler, MultiHandler, SharedHandler, TextHandler};
pub use layer::{install_tracing_bridge, HandlerLayer};
pub use logger::{default_logger, set_default, Logger};
pub use record::{Attr, Level, Record, Value};
pub use rotate::RotatingFile;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Fan-out handler writing text to stdout and JSON lines to a rotating file
pub fn console_and_file_handler(config: &LoggerConfig) -> Result<MultiHandler> {
    if let Some(dir) = config
        .file
        .filename
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {:?}", dir))?;
    }

    let console: SharedHandler = Arc::new(TextHandler::stdout(config.console_options()));
    let file: SharedHandler = Arc::new(JsonHandler::new(
        RotatingFile::new(&config.file),
        config.file_options(),
    ));

    Ok(MultiHandler::new(vec![console, file]))
}

/// Build the console + file logger and install it as the default logger.
///
/// Call once at startup. The returned `Logger` is the one now installed.
pub fn init_multi_logger(config: &LoggerConfig) -> Result<Logger> {
    let handler = console_and_file_handler(config)?;
    let logger = Logger::new(Arc::new(handler));
    set_default(logger.clone());

    info!(
        "Logging to console ({}) and {:?} ({})",
        config.console_level, config.file.filename, config.file_level
    );
    Ok(logger)
}
