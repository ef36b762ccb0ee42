//! Crate-level error type.
//!
//! Format parsers keep their own error enums; this wraps them together with
//! I/O and configuration failures for callers working at the file level.

use thiserror::Error;

use crate::formats::pe::PeError;
use crate::io::error::IoError;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// PE parsing errors, including allocation failure during a build
    #[error("PE error: {0}")]
    Pe(#[from] PeError),

    /// Opening or mapping the image failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;
