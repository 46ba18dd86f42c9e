//! Unified error types for the fan controller.
//!
//! Three families, matching how each is handled:
//!
//! - [`ReadError`]: a collaborator could not produce a value.  Always
//!   recovered locally with a sentinel default and logged.
//! - [`WriteError`]: persistence or an actuator command did not take
//!   effect.  Logged, never retried within a cycle.
//! - [`ConfigError`]: a zone's static configuration is invalid.  Fatal
//!   for that zone only.
//!
//! All variants are `Copy` so they can be embedded in events without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Read(ReadError),
    Write(WriteError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read: {e}"),
            Self::Write(e) => write!(f, "write: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Read failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The device, variable or state does not exist.
    Missing(&'static str),
    /// A value exists but has the wrong type or cannot be parsed.
    Malformed(&'static str),
    /// A name-based lookup (e.g. thermostat by name) found nothing.
    LookupMiss,
    /// The backing service did not answer.
    Unavailable,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(what) => write!(f, "{what} missing"),
            Self::Malformed(what) => write!(f, "{what} malformed"),
            Self::LookupMiss => write!(f, "lookup found no match"),
            Self::Unavailable => write!(f, "source unavailable"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

// ---------------------------------------------------------------------------
// Write failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// The target refused the value (unknown key, out of range).
    Rejected(&'static str),
    /// The backing service did not answer.
    Unavailable,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(what) => write!(f, "{what} rejected"),
            Self::Unavailable => write!(f, "target unavailable"),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<WriteError> for Error {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration source found.
    NotFound,
    /// The configuration could not be deserialized.
    Corrupted,
    /// A field failed validation.  The message names the field and rule.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
