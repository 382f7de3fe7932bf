//! Handler capability and the built-in handlers
//!
//! - `multi` - fan-out over an ordered list of child handlers
//! - `text` - human-readable `key=value` lines (console)
//! - `json` - one JSON object per line (file)

mod json;
mod multi;
mod scope;
mod text;

pub use json::JsonHandler;
pub use multi::MultiHandler;
pub use scope::{Scope, ScopedAttr};
pub use text::TextHandler;

use crate::{Attr, HandlerError, Level, Record};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Shared, dynamically dispatched handler
pub type SharedHandler = Arc<dyn Handler>;

/// Destination for log records
///
/// Implementations must be safe to call from any thread. `with_attrs` and
/// `with_group` return new handlers and leave the receiver as it was.
pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be handled
    fn enabled(&self, level: Level) -> bool;

    /// Deliver a record
    fn handle(&self, record: &Record) -> Result<(), HandlerError>;

    /// Handler that adds `attrs` to every record
    fn with_attrs(&self, attrs: &[Attr]) -> SharedHandler;

    /// Handler that qualifies all later attributes with group `name`
    fn with_group(&self, name: &str) -> SharedHandler;
}

/// Options shared by the built-in handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Minimum level handled
    pub level: Level,
}

impl HandlerOptions {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

/// Writer shared between a handler and the handlers derived from it
pub(crate) type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub(crate) fn shared_writer<W>(writer: W) -> SharedWriter
where
    W: Write + Send + 'static,
{
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Write one encoded line and flush it while holding the writer lock
pub(crate) fn write_line(writer: &SharedWriter, line: &[u8]) -> Result<(), HandlerError> {
    let mut w = writer.lock();
    w.write_all(line)?;
    w.flush()?;
    Ok(())
}
