//! Fan-out handler
//!
//! Presents one `Handler` backed by an ordered list of child handlers. Every
//! operation is forwarded to the children in construction order.

use super::{Handler, SharedHandler};
use crate::{Attr, HandlerError, Level, Record};
use std::fmt;
use std::sync::Arc;

/// Handler that forwards every record to all of its children
///
/// The child list is fixed at construction. `with_attrs` and `with_group`
/// build a new `MultiHandler` from the children's derived handlers.
#[derive(Clone, Default)]
pub struct MultiHandler {
    handlers: Vec<SharedHandler>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<SharedHandler>) -> Self {
        Self { handlers }
    }

    /// Children in forwarding order
    pub fn handlers(&self) -> &[SharedHandler] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Handler for MultiHandler {
    /// True if any child would handle `level`
    fn enabled(&self, level: Level) -> bool {
        self.handlers.iter().any(|h| h.enabled(level))
    }

    /// Forward `record` to each child in order.
    ///
    /// Stops at the first child that fails and returns its error wrapped with
    /// the child's position; children after it do not see the record.
    fn handle(&self, record: &Record) -> Result<(), HandlerError> {
        for (index, handler) in self.handlers.iter().enumerate() {
            handler.handle(record).map_err(|e| HandlerError::Child {
                index,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    fn with_attrs(&self, attrs: &[Attr]) -> SharedHandler {
        Arc::new(Self {
            handlers: self.handlers.iter().map(|h| h.with_attrs(attrs)).collect(),
        })
    }

    fn with_group(&self, name: &str) -> SharedHandler {
        Arc::new(Self {
            handlers: self.handlers.iter().map(|h| h.with_group(name)).collect(),
        })
    }
}

impl FromIterator<SharedHandler> for MultiHandler {
    fn from_iter<I: IntoIterator<Item = SharedHandler>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for MultiHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiHandler")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
