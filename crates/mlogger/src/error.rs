//! Error types

use thiserror::Error;

/// Failure to deliver a record to a handler's destination
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Writing to the destination failed
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the record failed
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    /// A child of a fan-out handler failed; later children were skipped
    #[error("handler #{index} failed: {source}")]
    Child {
        index: usize,
        #[source]
        source: Box<HandlerError>,
    },
}

impl HandlerError {
    /// Innermost error, unwrapping fan-out nesting
    pub fn root(&self) -> &HandlerError {
        match self {
            Self::Child { source, .. } => source.root(),
            other => other,
        }
    }

    /// Index path of the failing handler through nested fan-out handlers
    pub fn path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Child { index, source } = current {
            path.push(*index);
            current = source;
        }
        path
    }
}

/// Invalid logger configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level for {var}: {value:?}")]
    InvalidLevel { var: &'static str, value: String },

    #[error("invalid number for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("invalid boolean for {var}: {value:?}")]
    InvalidBool { var: &'static str, value: String },
}
