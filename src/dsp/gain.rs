//! # Gain Stage
//!
//! Converts a gain control in decibels into the linear multiplier applied
//! to each delayed sample.
//!
//! ```text
//! coefficient = 10^(dB / 20) = 10^(dB * 0.05)
//! ```
//!
//! Anything at or below -90 dB is treated as a hard mute. Very negative
//! values would otherwise produce denormal-sized multipliers, and `-inf`
//! must come out as exactly zero.

/// At or below this level the gain stage outputs exactly `0.0`.
pub const MUTE_THRESHOLD_DB: f32 = -90.0;

/// Convert a decibel value into a linear gain coefficient.
///
/// - `0 dB`   → `1.0`
/// - `-20 dB` → `0.1`
/// - `-6 dB`  → `≈ 0.501`
/// - `<= -90 dB` (or NaN) → `0.0`
///
/// Called once per channel per `process()` call, never per sample.
pub fn db_to_coefficient(db: f32) -> f32 {
    // NaN fails this comparison and mutes.
    if db > MUTE_THRESHOLD_DB {
        10.0_f32.powf(db * 0.05)
    } else {
        0.0
    }
}
