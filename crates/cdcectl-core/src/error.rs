//! Error types for cdcectl-core
//!
//! The core error is a plain `Copy` enum so it can be used without an
//! allocator. Transport crates carry richer errors of their own and map
//! them onto these kinds.

use core::fmt;

/// Core error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bridge did not finish a response before the read deadline
    Timeout,
    /// A response was missing an expected line or could not be parsed
    ProtocolViolation,
    /// A caller-supplied value is outside its documented domain
    InvalidArgument,
    /// A requested setting (or the frequency it implies) is outside the
    /// range the chip supports
    OutOfRange,
    /// The underlying transport failed
    Io,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for bridge response"),
            Self::ProtocolViolation => write!(f, "malformed or incomplete bridge response"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
