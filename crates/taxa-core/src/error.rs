//! Core error types.

use thiserror::Error;

/// Errors raised by store loading and query parsing.
///
/// Missing references are never errors: lookups that find nothing simply
/// yield no match. These variants cover malformed input only.
#[derive(Debug, Error)]
pub enum Error {
    /// A connection criterion was not of the form `<path>:<id>`.
    #[error("malformed query '{query}': expected '<path>:<id>'")]
    MalformedQuery { query: String },

    /// An unrecognized sort order or sort type name.
    #[error("unknown {kind} '{value}'")]
    UnknownOption { kind: &'static str, value: String },

    /// Snapshot decoding error.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Snapshot could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data shape in a loaded snapshot.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
