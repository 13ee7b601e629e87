//! # Errors
//!
//! Everything that can go wrong happens before the first `process()`
//! call. Once a [`StereoDelay`](crate::engine::StereoDelay) exists,
//! processing is infallible: control values are clamped and every buffer
//! index is derived from those clamped values.

use thiserror::Error;

/// Failure while building the delay engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelDelayError {
    /// The host reported a sample rate we can't size a buffer from
    /// (non-finite, zero, negative, or so small the buffer rounds to
    /// zero slots).
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// The worst-case delay buffer could not be reserved.
    #[error("failed to allocate delay buffer of {samples} samples")]
    AllocationFailed { samples: usize },
}
