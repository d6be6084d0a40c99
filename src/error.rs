use std::path::PathBuf;

/// Errors produced by the storage engine.
///
/// Variants map onto the kinds described for this engine: I/O failures are
/// fatal and propagated; decode failures are downgraded to "not found" by
/// callers that can tolerate it (`Store::get`, `Store::scan`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to open a file.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read from a file.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to a file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to seek within a file.
    #[error("failed to seek {path}: {source}")]
    Seek {
        /// Path being sought in.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename the temp file over the live SST path.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        /// Temp file path.
        from: PathBuf,
        /// Destination SST path.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A block record or index line could not be parsed as the expected
    /// comma-separated layout.
    #[error("malformed record at byte offset {offset}: {detail}")]
    DecodeCsv {
        /// Byte offset the malformed record started at, where known.
        offset: u64,
        /// Human-readable description of what was expected.
        detail: String,
    },

    /// A `size` or `offset` field could not be parsed as a base-10 integer.
    #[error("malformed integer field {field:?}: {source}")]
    DecodeInt {
        /// Raw field text that failed to parse.
        field: String,
        /// Underlying parse error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// The driver submitted a command with an operation type the engine
    /// does not recognize.
    #[error("unknown command type {0:?}")]
    InvalidCommand(String),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
