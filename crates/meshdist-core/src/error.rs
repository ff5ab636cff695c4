//! Error types for meshdist-rs.

use thiserror::Error;

/// The main error type for meshdist-rs operations.
///
/// Every parser and constructor returns either a value or one of these
/// kinds; callers may recover at the loader boundary. Inside the distance
/// kernel [`MeshError::NumericAbort`] is fatal to the current computation
/// and no partial statistics are exposed.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The input path could not be opened.
    #[error("cannot open '{0}'")]
    BadFilename(String),

    /// The file format could not be detected, or was detected but is not
    /// supported (e.g. PLY).
    #[error("unknown or unsupported file format")]
    BadFormat,

    /// The tokenizer was exhausted unexpectedly, or a non-numeric token was
    /// found where a number was expected.
    #[error("corrupted or truncated input")]
    Corrupted,

    /// A face with more than three vertices was encountered.
    #[error("not a triangular mesh")]
    NotTriangular,

    /// Out-of-range indices, mismatched normal counts or bogus element
    /// counts.
    #[error("invalid model: {0}")]
    Model(&'static str),

    /// An allocation could not be satisfied.
    #[error("out of memory")]
    NoMem,

    /// A NaN or infinite distance was produced inside the distance kernel,
    /// usually caused by NaN or infinite coordinates in a model.
    #[error("NaN or infinite value encountered in model")]
    NumericAbort,
}

/// A specialized Result type for meshdist-rs operations.
pub type Result<T> = std::result::Result<T, MeshError>;
