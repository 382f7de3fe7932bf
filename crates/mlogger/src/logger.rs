//! Logger facade and the process-wide default logger
//!
//! `Logger` is what application code calls. It checks whether the handler
//! wants a level before building the record, and keeps handler failures away
//! from the caller. The default logger is set once at startup with
//! [`set_default`]; tests should build their own `Logger` instead.

use crate::handler::{Handler, HandlerOptions, SharedHandler, TextHandler};
use crate::{Attr, HandlerError, Level, Record};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref DEFAULT_LOGGER: RwLock<Logger> = RwLock::new(Logger::new(Arc::new(
        TextHandler::stderr(HandlerOptions::default())
    )));
}

/// Leveled, structured logger backed by a handler
#[derive(Clone)]
pub struct Logger {
    handler: SharedHandler,
}

impl Logger {
    pub fn new(handler: SharedHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Log a record, reporting handler failures on stderr
    pub fn log(&self, level: Level, message: &str, attrs: &[Attr]) {
        if let Err(e) = self.try_log(level, message, attrs) {
            eprintln!("mlogger: {}", e);
        }
    }

    /// Log a record and return the handler's result.
    ///
    /// Records below the handler's level are dropped without being built and
    /// count as success.
    pub fn try_log(&self, level: Level, message: &str, attrs: &[Attr]) -> Result<(), HandlerError> {
        if !self.handler.enabled(level) {
            return Ok(());
        }
        let record = Record::new(level, message).with_attrs(attrs.iter().cloned());
        self.handler.handle(&record)
    }

    pub fn trace(&self, message: &str, attrs: &[Attr]) {
        self.log(Level::Trace, message, attrs);
    }

    pub fn debug(&self, message: &str, attrs: &[Attr]) {
        self.log(Level::Debug, message, attrs);
    }

    pub fn info(&self, message: &str, attrs: &[Attr]) {
        self.log(Level::Info, message, attrs);
    }

    pub fn warn(&self, message: &str, attrs: &[Attr]) {
        self.log(Level::Warn, message, attrs);
    }

    pub fn error(&self, message: &str, attrs: &[Attr]) {
        self.log(Level::Error, message, attrs);
    }

    /// Logger whose records all carry `attrs`
    pub fn with(&self, attrs: &[Attr]) -> Logger {
        if attrs.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_attrs(attrs))
    }

    /// Logger whose later attributes are qualified by group `name`
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_group(name))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Replace the process-wide default logger
pub fn set_default(logger: Logger) {
    *DEFAULT_LOGGER.write() = logger;
    debug!("Default logger replaced");
}

/// Clone of the current default logger
pub fn default_logger() -> Logger {
    DEFAULT_LOGGER.read().clone()
}

pub fn trace(message: &str, attrs: &[Attr]) {
    default_logger().trace(message, attrs);
}

pub fn debug(message: &str, attrs: &[Attr]) {
    default_logger().debug(message, attrs);
}

pub fn info(message: &str, attrs: &[Attr]) {
    default_logger().info(message, attrs);
}

pub fn warn(message: &str, attrs: &[Attr]) {
    default_logger().warn(message, attrs);
}

pub fn error(message: &str, attrs: &[Attr]) {
    default_logger().error(message, attrs);
}
