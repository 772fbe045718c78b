//! The crate's error type.
//!
//! Everything fallible in this crate's public API returns [`Result`]; there
//! is exactly one error type, no per-module variants.

use core::fmt;

/// The three kinds of failure this crate surfaces.
///
/// Every condition that is not one of these is defined arithmetic behavior
/// (ring overflow, wraparound) and never returns an error: evaluators do not
/// validate that their input came from a matching generator, and a malformed
/// key simply produces a meaningless but non-crashing result, by design.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A programmer-error contract violation: a NULL/empty buffer where one
    /// was required, a wrong-length seed, or mismatched `l` / `K` between a
    /// batch setup call and the corresponding eval call. Never retriable.
    InvalidArgument(&'static str),
    /// The process-wide CSPRNG could not be initialized. Fatal: the library
    /// cannot provide its security contract without randomness.
    CsprngUnavailable,
    /// A heap allocation failed while sizing a batch buffer. Fatal.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::CsprngUnavailable => write!(f, "CSPRNG unavailable"),
            Error::OutOfMemory => write!(f, "allocation failed"),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
