//! # DSP Primitives
//!
//! - **`gain`**: decibel to linear gain conversion, with a hard mute at
//!   the bottom of the range.
//!
//! - **`delay_channel`**: a fixed-capacity delay line whose active length
//!   can be changed at runtime. It re-primes (goes silent, then refills)
//!   whenever the delay length changes.

pub mod delay_channel;
pub mod gain;
