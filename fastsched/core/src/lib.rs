#![no_std]
#![forbid(unsafe_code)]

//! # FastSched Core
//!
//! Core types and contracts for the FastSched cooperative scheduler.
//! This crate provides the leaf building blocks consumed by the executor:
//! the execution-policy tag, wrap-safe microsecond time, the polled
//! periodic-timeout primitive, and the platform contract the host
//! firmware implements.

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod platform;
pub mod policy;
pub mod time;

pub use platform::*;
pub use policy::*;
pub use time::*;

/// FastSched version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout FastSched
pub type SchedResult<T> = Result<T, SchedError>;

/// Error types for scheduler operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// The bounded schedule queue already holds its maximum number of
    /// live items; the submission was rejected and nothing was stored.
    QueueFull,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::QueueFull => write!(f, "Schedule queue is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchedError {}

#[cfg(feature = "defmt")]
impl defmt::Format for SchedError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SchedError::QueueFull => defmt::write!(fmt, "QueueFull"),
        }
    }
}
