//! # Plugin Parameters
//!
//! Four controls, two per channel: a gain in dB and a delay in ms. The
//! IDs (`gain_l`, `delay_l`, `gain_r`, `delay_r`) are what hosts store in
//! sessions and presets, so they must never change.
//!
//! ## No smoothing
//!
//! Unlike a typical delay plugin, none of these parameters are smoothed.
//! The engine samples each control once per `process()` call, and every
//! change in the delay value re-primes the channel (silence, then refill).
//! A smoothed delay would step through dozens of intermediate values and
//! re-prime on every one of them.

use nih_plug::prelude::*;

use crate::dsp::delay_channel::MAX_DELAY_MS;
use crate::dsp::gain::MUTE_THRESHOLD_DB;
use crate::engine::{ChannelControls, FrameControls};

/// Highest gain offered to the host.
const MAX_GAIN_DB: f32 = 24.0;

#[derive(Params)]
pub struct ChannelDelayParams {
    /// **Left Gain**: applied to the delayed left signal. The bottom of
    /// the range (-90 dB) is a hard mute.
    #[id = "gain_l"]
    pub gain_l: FloatParam,

    /// **Left Delay**: 0 to 2000 ms. 0 ms passes the signal straight
    /// through (scaled by the gain).
    #[id = "delay_l"]
    pub delay_l: FloatParam,

    #[id = "gain_r"]
    pub gain_r: FloatParam,

    #[id = "delay_r"]
    pub delay_r: FloatParam,
}

impl ChannelDelayParams {
    /// Snapshot the current control values for one frame.
    pub fn frame_controls(&self) -> FrameControls {
        FrameControls {
            left: ChannelControls {
                gain_db: self.gain_l.value(),
                delay_ms: self.delay_l.value(),
            },
            right: ChannelControls {
                gain_db: self.gain_r.value(),
                delay_ms: self.delay_r.value(),
            },
        }
    }
}

fn gain_param(name: &str) -> FloatParam {
    FloatParam::new(
        name,
        0.0, // Unity
        FloatRange::Linear {
            min: MUTE_THRESHOLD_DB,
            max: MAX_GAIN_DB,
        },
    )
    .with_unit(" dB")
    .with_step_size(0.1)
    .with_value_to_string(formatters::v2s_f32_rounded(1))
}

fn delay_param(name: &str) -> FloatParam {
    FloatParam::new(
        name,
        0.0, // No delay
        FloatRange::Skewed {
            min: 0.0,
            max: MAX_DELAY_MS,
            // More knob travel for short delays, where a few ms of
            // channel offset matters most.
            factor: FloatRange::skew_factor(-1.0),
        },
    )
    .with_unit(" ms")
    .with_step_size(0.1)
}

impl Default for ChannelDelayParams {
    fn default() -> Self {
        Self {
            gain_l: gain_param("Left Gain"),
            delay_l: delay_param("Left Delay"),
            gain_r: gain_param("Right Gain"),
            delay_r: delay_param("Right Delay"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_unity_and_no_delay() {
        let params = ChannelDelayParams::default();
        assert_eq!(params.frame_controls(), FrameControls::default());
    }

    #[test]
    fn test_ranges_cover_engine_limits() {
        let params = ChannelDelayParams::default();

        // Step-size snapping can shave off a few ulps at the ends.
        assert_relative_eq!(params.delay_l.preview_plain(0.0), 0.0, epsilon = 1e-3);
        assert_relative_eq!(params.delay_r.preview_plain(1.0), MAX_DELAY_MS, epsilon = 1e-3);
        assert_relative_eq!(params.gain_l.preview_plain(0.0), MUTE_THRESHOLD_DB, epsilon = 1e-3);
        assert_relative_eq!(params.gain_r.preview_plain(1.0), MAX_GAIN_DB, epsilon = 1e-3);
    }
}
